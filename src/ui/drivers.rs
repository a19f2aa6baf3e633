use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::data::DataStore;
use crate::ui::charts::{render_bar_chart, BarSeries};

const CHURN_INSIGHTS: [&str; 3] = [
    "Customers with high credit utilization and long inactivity periods are more likely to churn",
    "Stress-like financial behavior often precedes disengagement",
    "Early stress detection enables proactive intervention and improves retention",
];

pub fn render_drivers_view(frame: &mut Frame, area: Rect, data: &DataStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(CHURN_INSIGHTS.len() as u16 + 2),
        ])
        .split(area);

    render_bar_chart(
        frame,
        chunks[0],
        "Top Stress Drivers",
        "Percentage of Customers",
        &BarSeries::from_drivers(data.drivers()),
        Color::LightRed,
    );

    let lines: Vec<Line> = CHURN_INSIGHTS
        .iter()
        .map(|text| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::Cyan)),
                Span::raw(*text),
            ])
        })
        .collect();

    let insights = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Business Insights (Churn Validation) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(insights, chunks[1]);
}
