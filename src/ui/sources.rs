use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::data::DataStore;
use crate::ui::table::header_row;

pub fn render_sources_view(frame: &mut Frame, area: Rect, data: &DataStore) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // directory
            Constraint::Length(8),  // files
            Constraint::Min(0),
        ])
        .split(area);

    let dir = Paragraph::new(Line::from(vec![
        Span::styled("Directory: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            data.source_dir().display().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Location "));
    frame.render_widget(dir, sections[0]);

    let rows: Vec<Row> = data
        .row_counts()
        .iter()
        .map(|(file, count)| {
            let count_style = if *count == 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            };
            Row::new(vec![
                Cell::from(*file),
                Cell::from(format!("{}", count)).style(count_style),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(30), Constraint::Length(8)])
        .header(header_row(&["File", "Rows"]))
        .block(Block::default().borders(Borders::ALL).title(" Files "));
    frame.render_widget(table, sections[1]);
}
