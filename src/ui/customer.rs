use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::CustomerInput;
use crate::data::DataStore;
use crate::detail::{analyze_customer, CustomerDetail};
use crate::error::LookupError;
use crate::ui::charts::{render_line_chart, render_notice, LineSeries};
use crate::ui::table::render_monthly_table;

const INPUT_PLACEHOLDER: &str = "e.g., C1000000639";

/// Returns the monthly table's scroll offset after clamping, 0 when no table is shown
pub fn render_customer_view(
    frame: &mut Frame,
    area: Rect,
    data: &DataStore,
    input: &CustomerInput,
    scroll: usize,
) -> usize {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_input(frame, chunks[0], input);

    let id = match &input.submitted {
        Some(id) => id,
        None => {
            render_notice(
                frame,
                chunks[1],
                "Customer-Level Stress Analysis",
                "Enter a Customer ID and press Enter.",
                Color::Gray,
            );
            return 0;
        }
    };

    // A failed lookup stops the rest of this view
    match analyze_customer(data, id) {
        Ok(detail) => render_detail(frame, chunks[1], &detail, scroll),
        Err(e @ LookupError::NotFound { .. }) => {
            render_notice(frame, chunks[1], "Error", &e.to_string(), Color::LightRed);
            0
        }
        Err(e @ LookupError::NoMonthlyData { .. }) => {
            render_notice(frame, chunks[1], "No Data", &e.to_string(), Color::Yellow);
            0
        }
    }
}

fn render_input(frame: &mut Frame, area: Rect, input: &CustomerInput) {
    let text = if input.text.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(input.text.clone(), Style::default().fg(Color::White))
    };

    let field = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Enter Customer ID ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(field, area);

    let cursor_x = area.x + 1 + input.text.chars().count() as u16;
    if cursor_x < area.right().saturating_sub(1) {
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &CustomerDetail, scroll: usize) -> usize {
    let table_height = (detail.records.len() as u16 + 3).min(16);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),                // timeline
            Constraint::Length(table_height),  // monthly table
            Constraint::Length(3),             // indicators
        ])
        .split(area);

    render_line_chart(
        frame,
        chunks[0],
        &format!("Monthly Stress Timeline - {}", detail.customer_id),
        "Stress Score",
        &LineSeries::from_records(&detail.records),
        Color::Magenta,
    );

    let scroll = render_monthly_table(frame, chunks[1], &detail.records, scroll);

    render_indicators(frame, chunks[2], detail);
    scroll
}

fn render_indicators(frame: &mut Frame, area: Rect, detail: &CustomerDetail) {
    let line = if detail.indicators.is_empty() {
        Line::from(Span::styled("No major stress indicators", Style::default().fg(Color::Green)))
    } else {
        let mut spans = Vec::new();
        for (i, indicator) in detail.indicators.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(", "));
            }
            let (mark, color) = if indicator.is_critical() {
                ("✖ ", Color::Red)
            } else {
                ("⚠ ", Color::Yellow)
            };
            spans.push(Span::styled(
                format!("{}{}", mark, indicator.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    };

    let title = match detail.latest() {
        Some(r) => format!(" Stress Indicators ({}) ", r.month),
        None => " Stress Indicators ".to_string(),
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(paragraph, area);
}
