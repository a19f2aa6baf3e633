use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::data::DataStore;
use crate::metrics::PortfolioMetrics;
use crate::ranking::{top_risk_customers, RankLimit};
use crate::ui::charts::{render_bar_chart, render_line_chart, BarSeries, LineSeries};
use crate::ui::table::render_top_risk_table;

const COLOR_ACCENT: Color = Color::Cyan;
const COLOR_BAR: Color = Color::Green;

/// Returns the ranking table's scroll offset after clamping
pub fn render_overview(frame: &mut Frame, area: Rect, data: &DataStore, limit: RankLimit, scroll: usize) -> usize {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // metric cards
            Constraint::Min(10),    // ranking + charts
        ])
        .split(area);

    render_metric_cards(frame, chunks[0], &PortfolioMetrics::from_summary(data.summary()));

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    // === Top-risk ranking ===
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(body[0]);

    render_slider(frame, left[0], limit);
    let scroll = render_top_risk_table(frame, left[1], &top_risk_customers(data.summary(), limit.get()), scroll);

    // === Distribution & trend ===
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);

    render_bar_chart(
        frame,
        right[0],
        "Stress Category Distribution",
        "Stress Category / Customer Count",
        &BarSeries::from_distribution(data.distribution()),
        COLOR_BAR,
    );
    render_line_chart(
        frame,
        right[1],
        "Stress Trend Over Time",
        "Average Stress Score",
        &LineSeries::from_trend(data.trend()),
        Color::Yellow,
    );

    scroll
}

fn render_metric_cards(frame: &mut Frame, area: Rect, metrics: &PortfolioMetrics) {
    let cards = [
        ("Total Customers", format!("{}", metrics.total_customers)),
        ("Stressed Customers (%)", format!("{:.1}%", metrics.stressed_pct)),
        ("Severe Stress (%)", format!("{:.1}%", metrics.severe_pct)),
        ("Avg Stress Score", format!("{:.2}", metrics.avg_stress)),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value), chunk) in cards.iter().zip(chunks.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(*label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                value.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(COLOR_ACCENT)));
        frame.render_widget(card, *chunk);
    }
}

fn render_slider(frame: &mut Frame, area: Rect, limit: RankLimit) {
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    " Number of high-risk customers to display ({}-{}) ",
                    RankLimit::MIN,
                    RankLimit::MAX
                ))
                .title_style(Style::default().fg(COLOR_ACCENT)),
        )
        .gauge_style(Style::default().fg(COLOR_BAR).bg(Color::DarkGray))
        .ratio(limit.ratio())
        .label(format!("{}", limit.get()));
    frame.render_widget(gauge, area);
}
