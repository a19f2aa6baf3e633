use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::parser::{MonthlyRecord, StressDistribution, StressDriver, StressTrend};

/// Bar heights are integers, so values are scaled before drawing
const BAR_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarUnit {
    Count,
    Percent,
}

impl BarUnit {
    fn format(&self, value: f64) -> String {
        match self {
            Self::Count => format!("{:.0}", value),
            Self::Percent => format!("{:.1}%", value),
        }
    }
}

/// One bar per (category, value) row, in row order
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub bars: Vec<(String, f64)>,
    pub unit: BarUnit,
}

impl BarSeries {
    pub fn from_distribution(rows: &[StressDistribution]) -> Self {
        Self {
            bars: rows
                .iter()
                .map(|r| (r.stress_category.clone(), r.count as f64))
                .collect(),
            unit: BarUnit::Count,
        }
    }

    pub fn from_drivers(rows: &[StressDriver]) -> Self {
        Self {
            bars: rows.iter().map(|r| (r.driver.clone(), r.percentage)).collect(),
            unit: BarUnit::Percent,
        }
    }

    /// Width per bar so that all bars fit in `inner_width`
    pub fn bar_width(&self, inner_width: u16, gap: u16) -> u16 {
        let n = self.bars.len().max(1) as u16;
        (inner_width.saturating_sub(gap * n) / n).clamp(1, 16)
    }
}

/// Points over months, drawn in row order. x is the row position.
/// Rows without a finite value keep their label but draw no point.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub labels: Vec<String>,
    pub points: Vec<(f64, f64)>,
}

impl LineSeries {
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut labels = Vec::new();
        let mut points = Vec::new();
        for (i, (label, value)) in rows.into_iter().enumerate() {
            labels.push(label);
            if value.is_finite() {
                points.push((i as f64, value));
            }
        }
        Self { labels, points }
    }

    pub fn from_trend(rows: &[StressTrend]) -> Self {
        Self::new(rows.iter().map(|r| (r.month.to_string(), r.stress_score)))
    }

    /// Caller passes records already sorted by month
    pub fn from_records(records: &[&MonthlyRecord]) -> Self {
        Self::new(records.iter().map(|r| (r.month.to_string(), r.stress_score)))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.labels.len().saturating_sub(1) as f64).max(1.0)]
    }

    /// Starts at zero unless values go negative, with headroom above the peak
    pub fn y_bounds(&self) -> [f64; 2] {
        let min = self.points.iter().map(|p| p.1).fold(0.0, f64::min);
        let max = self.points.iter().map(|p| p.1).fold(f64::MIN, f64::max);
        if self.points.is_empty() || max <= min {
            return [min, min + 1.0];
        }
        [min, max + (max - min) * 0.1]
    }

    /// First, middle and last month labels
    pub fn x_labels(&self) -> Vec<String> {
        match self.labels.len() {
            0 => Vec::new(),
            1 | 2 => self.labels.clone(),
            n => vec![
                self.labels[0].clone(),
                self.labels[n / 2].clone(),
                self.labels[n - 1].clone(),
            ],
        }
    }
}

/// Scaled integer height; missing or infinite values draw no bar
fn bar_height(value: f64) -> u64 {
    if value.is_finite() {
        (value.max(0.0) * BAR_SCALE).round() as u64
    } else {
        0
    }
}

fn empty_chart(frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} - No Data ", title))
        .title_style(Style::default().fg(Color::Yellow));
    frame.render_widget(block, area);
}

pub fn render_bar_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    axis_label: &str,
    series: &BarSeries,
    color: Color,
) {
    if series.bars.is_empty() {
        empty_chart(frame, area, title);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .title_bottom(Line::from(format!(" {} ", axis_label)).style(Style::default().fg(Color::Gray)));

    let gap = 1;
    let bar_width = series.bar_width(block.inner(area).width, gap);

    let bars: Vec<Bar> = series
        .bars
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(bar_height(*value))
                .text_value(series.unit.format(*value))
                .label(Line::from(label.clone()))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
        .label_style(Style::default().fg(Color::White));

    frame.render_widget(chart, area);
}

/// Line chart with point markers
pub fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    y_title: &str,
    series: &LineSeries,
    color: Color,
) {
    if series.is_empty() {
        empty_chart(frame, area, title);
        return;
    }

    let datasets = vec![
        Dataset::default()
            .name(y_title.to_string())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&series.points),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .data(&series.points),
    ];

    let [y_min, y_max] = series.y_bounds();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        )
        .x_axis(
            Axis::default()
                .title("Month")
                .style(Style::default().fg(Color::Gray))
                .bounds(series.x_bounds())
                .labels(series.x_labels().into_iter().map(Span::from).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::from(format!("{:.1}", y_min)),
                    Span::from(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::from(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Placeholder text inside a bordered block
pub fn render_notice(frame: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let notice = Paragraph::new(Line::from(Span::styled(text.to_string(), Style::default().fg(color))))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(notice, area);
}
