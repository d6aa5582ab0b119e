//! # TitleBar and TabBar
//!
//! The two rows at the top of every screen.
//!
//! `TitleBar` is stateless: app name, the signed-in user, the status
//! message and a spinner while requests are in flight.
//!
//! `TabBar` lists the screens the current role may open. Babies stays
//! disabled until the admin makes them visible. Drawn tab positions are
//! written back so clicks can be hit-tested on the next event.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::api::types::Role;
use crate::core::routing::Screen;
use crate::core::session::Session;
use crate::tui::component::Component;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Top status bar.
pub struct TitleBar {
    pub user: Option<String>,
    pub status_message: String,
    /// `Some(frame)` while loading.
    pub spinner_frame: Option<usize>,
}

impl TitleBar {
    pub fn new(user: Option<String>, status_message: String, spinner_frame: Option<usize>) -> Self {
        Self {
            user,
            status_message,
            spinner_frame,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "AI Baby",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(user) = &self.user {
            spans.push(Span::raw(format!(" ({user})")));
        }
        if let Some(tick) = self.spinner_frame {
            spans.push(Span::raw(format!(" {}", SPINNER[tick % SPINNER.len()])));
        }
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message.as_str(),
                Style::default().fg(Color::Gray),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }
}

/// Screens reachable from the tab bar, in order, for this session.
pub fn tabs(session: &Session) -> Vec<Screen> {
    match session.user.as_ref().map(|u| u.role) {
        None => vec![],
        Some(Role::Admin) => vec![Screen::Admin, Screen::Profile, Screen::Babies],
        Some(Role::User) => vec![
            Screen::Profile,
            Screen::Questionnaire,
            Screen::Babies,
            Screen::MyBabies,
        ],
    }
}

pub struct TabBar<'a> {
    tabs: &'a [Screen],
    current: Screen,
    babies_enabled: bool,
    hits: &'a mut Vec<(Screen, Rect)>,
}

impl<'a> TabBar<'a> {
    pub fn new(
        tabs: &'a [Screen],
        current: Screen,
        babies_enabled: bool,
        hits: &'a mut Vec<(Screen, Rect)>,
    ) -> Self {
        Self {
            tabs,
            current,
            babies_enabled,
            hits,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.hits.clear();
        let mut x = area.x;
        for (i, &screen) in self.tabs.iter().enumerate() {
            let disabled = screen == Screen::Babies && !self.babies_enabled;
            let label = if disabled {
                format!(" F{} {} (Disabled) ", i + 1, screen.title())
            } else {
                format!(" F{} {} ", i + 1, screen.title())
            };
            let style = if screen == self.current {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray)
            };
            let width = (label.chars().count() as u16).min(area.right().saturating_sub(x));
            if width == 0 {
                break;
            }
            let rect = Rect::new(x, area.y, width, 1);
            frame.render_widget(Span::styled(label, style), rect);
            if !disabled {
                self.hits.push((screen, rect));
            }
            x = x.saturating_add(width + 1);
        }
    }
}

/// Which tab, if any, was clicked.
pub fn tab_at(hits: &[(Screen, Rect)], col: u16, row: u16) -> Option<Screen> {
    hits.iter()
        .find(|(_, r)| r.contains(Position::new(col, row)))
        .map(|(s, _)| *s)
}
