use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::parser::{CustomerSummary, MonthlyRecord};

const COLOR_HEADER: Color = Color::Cyan;

/// Stress scores at or above this are highlighted
const HIGH_STRESS: f64 = 6.0;

pub fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(COLOR_HEADER).add_modifier(Modifier::BOLD)));
    Row::new(cells).height(1).bottom_margin(0)
}

/// Money with thousands separators, e.g. "-12,345.60"
pub fn fmt_money(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

pub fn fmt_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// Stress scores keep two decimals so 5.6 never reads as 6
pub fn fmt_score(value: f64) -> String {
    format!("{:.2}", value)
}

/// Body rows that fit inside the borders, under the header
fn page_size(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// First and one-past-last visible row. The offset is pulled back so the
/// last page is always full.
pub fn scroll_window(offset: usize, total: usize, page: usize) -> (usize, usize) {
    let start = offset.min(total.saturating_sub(page));
    (start, (start + page).min(total))
}

fn window_title(name: &str, start: usize, end: usize, total: usize) -> String {
    if start == 0 && end >= total {
        format!(" {} ", name)
    } else {
        format!(" {} (showing {}-{} of {}) ", name, start + 1, end, total)
    }
}

fn stress_style(score: f64) -> Style {
    if score >= HIGH_STRESS {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn titled_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}

/// Renders from row `offset` and returns the offset actually used
pub fn render_top_risk_table(
    frame: &mut Frame,
    area: Rect,
    rows: &[&CustomerSummary],
    offset: usize,
) -> usize {
    let header = header_row(&["#", "Customer ID", "Max Stress Score", "Stressed Months", "Avg Stress Score"]);

    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(c.customer_id.clone()),
                Cell::from(fmt_score(c.max_stress)).style(stress_style(c.max_stress)),
                Cell::from(format!("{}", c.stressed_months)),
                Cell::from(fmt_score(c.avg_stress)),
            ])
            .height(1)
        })
        .collect();

    let widths = [
        Constraint::Length(3),   // rank
        Constraint::Min(12),     // Customer ID
        Constraint::Length(16),  // Max
        Constraint::Length(15),  // Months
        Constraint::Length(16),  // Avg
    ];

    let (start, end) = scroll_window(offset, rows.len(), page_size(area));
    let title = if rows.is_empty() {
        " Top High-Risk Customers (none) ".to_string()
    } else {
        window_title(&format!("Top {} High-Risk Customers", rows.len()), start, end, rows.len())
    };

    let table = Table::new(body, widths).header(header).block(titled_block(title));

    let mut state = TableState::default().with_offset(start);
    frame.render_stateful_widget(table, area, &mut state);
    start
}

/// Renders from row `offset` and returns the offset actually used
pub fn render_monthly_table(frame: &mut Frame, area: Rect, records: &[&MonthlyRecord], offset: usize) -> usize {
    let header = header_row(&["Month", "Income", "Expense", "Savings", "Transfer", "Category"]);

    let body: Vec<Row> = records
        .iter()
        .map(|r| {
            let savings_style = if r.savings < 0.0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(r.month.to_string()),
                Cell::from(fmt_money(r.monthly_income)),
                Cell::from(fmt_money(r.monthly_expense)),
                Cell::from(fmt_money(r.savings)).style(savings_style),
                Cell::from(fmt_ratio(r.transfer_ratio)),
                Cell::from(r.stress_category.clone()).style(stress_style(r.stress_score)),
            ])
            .height(1)
        })
        .collect();

    let widths = [
        Constraint::Length(10),  // Month
        Constraint::Length(14),  // Income
        Constraint::Length(14),  // Expense
        Constraint::Length(14),  // Savings
        Constraint::Length(9),   // Transfer
        Constraint::Min(10),     // Category
    ];

    let (start, end) = scroll_window(offset, records.len(), page_size(area));
    let title = window_title("Monthly Financial Summary", start, end, records.len());

    let table = Table::new(body, widths).header(header).block(titled_block(title));

    let mut state = TableState::default().with_offset(start);
    frame.render_stateful_widget(table, area, &mut state);
    start
}
