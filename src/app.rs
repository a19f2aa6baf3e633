use std::cell::Cell;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};

use crate::data::DataStore;
use crate::ranking::RankLimit;
use crate::ui::customer::render_customer_view;
use crate::ui::drivers::render_drivers_view;
use crate::ui::overview::render_overview;
use crate::ui::sources::render_sources_view;
use crate::ui::status::{render_help_bar, render_status_bar};

/// Slider step for PgUp/PgDn
const RANK_PAGE_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Overview,
    CustomerAnalysis,
    StressDrivers,
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::CustomerAnalysis => "Customer Analysis",
            Self::StressDrivers => "Stress Drivers & Churn",
        }
    }

    pub fn all() -> &'static [ViewMode] {
        &[ViewMode::Overview, ViewMode::CustomerAnalysis, ViewMode::StressDrivers]
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Overview => Self::CustomerAnalysis,
            Self::CustomerAnalysis => Self::StressDrivers,
            Self::StressDrivers => Self::Overview,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Overview => Self::StressDrivers,
            Self::CustomerAnalysis => Self::Overview,
            Self::StressDrivers => Self::CustomerAnalysis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Sources,
}

/// Customer id field. Lookup runs against `submitted` only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInput {
    pub text: String,
    pub submitted: Option<String>,
}

impl CustomerInput {
    fn submit(&mut self) {
        let id = self.text.trim();
        self.submitted = if id.is_empty() { None } else { Some(id.to_string()) };
    }
}

pub struct App<'a> {
    data: &'a DataStore,
    view_mode: ViewMode,
    overlay: Overlay,
    start_limit: RankLimit,
    rank_limit: RankLimit,
    customer: CustomerInput,
    /// First visible row of the active view's table. Render writes back the clamped value.
    scroll: Cell<usize>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(data: &'a DataStore, start_limit: RankLimit) -> Self {
        Self {
            data,
            view_mode: ViewMode::Overview,
            overlay: Overlay::None,
            start_limit,
            rank_limit: start_limit,
            customer: CustomerInput::default(),
            scroll: Cell::new(0),
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.render(frame))
                .context("Failed to draw frame")?;

            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }

        Ok(())
    }

    /// Switching views drops everything typed or adjusted in the old one
    fn switch_view(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        log::debug!("view {} -> {}", self.view_mode.name(), mode.name());
        self.view_mode = mode;
        self.customer = CustomerInput::default();
        self.rank_limit = self.start_limit;
        self.scroll.set(0);
    }

    fn scroll_by(&self, up: bool) {
        let offset = self.scroll.get();
        self.scroll.set(if up { offset.saturating_sub(1) } else { offset + 1 });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // If overlay is open, Esc/Enter/same key closes it
        if self.overlay != Overlay::None {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('i') => {
                    self.overlay = Overlay::None;
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        let target = match key.code {
            KeyCode::Tab => Some(self.view_mode.next()),
            KeyCode::BackTab => Some(self.view_mode.prev()),
            _ => None,
        };
        if let Some(mode) = target {
            self.switch_view(mode);
            return;
        }

        if self.view_mode == ViewMode::CustomerAnalysis {
            self.handle_customer_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.switch_view(ViewMode::Overview),
            KeyCode::Char('2') => self.switch_view(ViewMode::CustomerAnalysis),
            KeyCode::Char('3') => self.switch_view(ViewMode::StressDrivers),
            KeyCode::Char('i') => self.overlay = Overlay::Sources,
            _ if self.view_mode == ViewMode::Overview => self.handle_slider_key(key),
            _ => {}
        }
    }

    fn handle_slider_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.rank_limit.increase(1),
            KeyCode::Left | KeyCode::Char('-') => self.rank_limit.decrease(1),
            KeyCode::Up => self.scroll_by(true),
            KeyCode::Down => self.scroll_by(false),
            KeyCode::PageUp => self.rank_limit.increase(RANK_PAGE_STEP),
            KeyCode::PageDown => self.rank_limit.decrease(RANK_PAGE_STEP),
            _ => {}
        }
    }

    /// Text entry owns printable keys in this view
    fn handle_customer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.customer.text.push(c),
            KeyCode::Backspace => {
                self.customer.text.pop();
            }
            KeyCode::Up => self.scroll_by(true),
            KeyCode::Down => self.scroll_by(false),
            KeyCode::Enter => {
                self.customer.submit();
                self.scroll.set(0);
                log::debug!("customer lookup: {:?}", self.customer.submitted);
            }
            KeyCode::Esc if !self.customer.text.is_empty() => {
                self.customer = CustomerInput::default();
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        render_status_bar(frame, chunks[0], self.data.summary().len(), &self.view_mode);

        // Every render re-evaluates the active view from the loaded tables
        match self.view_mode {
            ViewMode::Overview => {
                let used = render_overview(frame, chunks[1], self.data, self.rank_limit, self.scroll.get());
                self.scroll.set(used);
            }
            ViewMode::CustomerAnalysis => {
                let used = render_customer_view(frame, chunks[1], self.data, &self.customer, self.scroll.get());
                self.scroll.set(used);
            }
            ViewMode::StressDrivers => {
                render_drivers_view(frame, chunks[1], self.data);
            }
        }

        render_help_bar(frame, chunks[2], &self.view_mode);

        match self.overlay {
            Overlay::None => {}
            Overlay::Sources => {
                self.render_overlay(frame, "Data Sources", |f, area| {
                    render_sources_view(f, area, self.data);
                });
            }
        }
    }

    fn render_overlay<F>(&self, frame: &mut Frame, title: &str, render_fn: F)
    where
        F: FnOnce(&mut Frame, Rect),
    {
        let area = frame.area();

        // Center the overlay, taking 80% of screen
        let popup_width = (area.width as f32 * 0.8) as u16;
        let popup_height = (area.height as f32 * 0.8) as u16;
        if popup_width < 6 || popup_height < 3 {
            return;
        }
        let popup_x = (area.width - popup_width) / 2;
        let popup_y = (area.height - popup_height) / 2;

        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", title))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        render_fn(frame, inner);

        let hint = Paragraph::new(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]));
        let hint_area = Rect::new(popup_x + 2, popup_y + popup_height - 1, popup_width - 4, 1);
        frame.render_widget(hint, hint_area);
    }
}
