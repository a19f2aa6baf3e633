use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::ViewMode;

pub const DASHBOARD_TITLE: &str = "Silent Financial Stress Detection Dashboard";
const FOOTER: &str = "Silent Financial Stress Detection | Data Analytics Project";

const COLOR_KEY: Color = Color::Cyan;

pub fn render_status_bar(frame: &mut Frame, area: Rect, customers: usize, view_mode: &ViewMode) {
    let mut spans = vec![
        Span::styled(DASHBOARD_TITLE, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled("Customers: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{}", customers), Style::default().fg(Color::White)),
        Span::raw("  "),
    ];

    // Tab indicators
    for (i, mode) in ViewMode::all().iter().enumerate() {
        let style = if view_mode == mode {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" [{}]{} ", i + 1, mode.name()), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn key_hints(view_mode: &ViewMode) -> Vec<(&'static str, &'static str)> {
    match view_mode {
        ViewMode::Overview => vec![
            ("[q]", " quit  "),
            ("[Tab/1-3]", " view  "),
            ("[←/→]", " top N  "),
            ("[PgUp/PgDn]", " top N ±5  "),
            ("[↑/↓]", " scroll  "),
            ("[i]", " sources"),
        ],
        ViewMode::CustomerAnalysis => vec![
            ("[Enter]", " look up  "),
            ("[↑/↓]", " scroll  "),
            ("[Esc]", " clear/quit  "),
            ("[Tab]", " view  "),
            ("[Ctrl-C]", " quit"),
        ],
        ViewMode::StressDrivers => vec![
            ("[q]", " quit  "),
            ("[Tab/1-3]", " view  "),
            ("[i]", " sources"),
        ],
    }
}

pub fn render_help_bar(frame: &mut Frame, area: Rect, view_mode: &ViewMode) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(FOOTER.len() as u16)])
        .split(area);

    let spans: Vec<Span> = key_hints(view_mode)
        .into_iter()
        .flat_map(|(key, action)| [Span::styled(key, Style::default().fg(COLOR_KEY)), Span::raw(action)])
        .collect();

    let help = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[0]);

    let footer = Paragraph::new(FOOTER).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[1]);
}
