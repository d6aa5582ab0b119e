//! # LoginForm Component
//!
//! Email and password, with a switch between logging in and creating an
//! account. Tab moves focus; Enter on the password submits.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::components::text_field::{TextField, TextFieldEvent};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Password,
    ModeSwitch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginEvent {
    Login { email: String, password: String },
    Register { email: String, password: String },
}

pub struct LoginForm {
    pub email: TextField,
    pub password: TextField,
    pub register: bool,
    focus: Focus,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        let mut form = Self {
            email: TextField::new(" Email "),
            password: TextField::new(" Password ").masked(),
            register: false,
            focus: Focus::Email,
        };
        form.sync_focus();
        form
    }

    fn sync_focus(&mut self) {
        self.email.focused = self.focus == Focus::Email;
        self.password.focused = self.focus == Focus::Password;
    }

    fn cycle(&mut self, forward: bool) {
        self.focus = match (self.focus, forward) {
            (Focus::Email, true) | (Focus::ModeSwitch, false) => Focus::Password,
            (Focus::Password, true) | (Focus::Email, false) => Focus::ModeSwitch,
            (Focus::ModeSwitch, true) | (Focus::Password, false) => Focus::Email,
        };
        self.sync_focus();
    }

    fn submit(&mut self) -> LoginEvent {
        let email = self.email.value().to_string();
        // Keep the email for a retry, never the password.
        let password = self.password.take();
        if self.register {
            LoginEvent::Register { email, password }
        } else {
            LoginEvent::Login { email, password }
        }
    }
}

impl EventHandler for LoginForm {
    type Event = LoginEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<LoginEvent> {
        match event {
            TuiEvent::NextField | TuiEvent::CursorDown => {
                self.cycle(true);
                None
            }
            TuiEvent::PrevField | TuiEvent::CursorUp => {
                self.cycle(false);
                None
            }
            _ => match self.focus {
                Focus::Email => match self.email.handle_event(event) {
                    Some(TextFieldEvent::Submit) => {
                        self.cycle(true);
                        None
                    }
                    _ => None,
                },
                Focus::Password => match self.password.handle_event(event) {
                    Some(TextFieldEvent::Submit) => Some(self.submit()),
                    _ => None,
                },
                Focus::ModeSwitch => {
                    if matches!(event, TuiEvent::Submit | TuiEvent::InputChar(' ')) {
                        self.register = !self.register;
                    }
                    None
                }
            },
        }
    }
}

impl Component for LoginForm {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let panel = centered_rect(50, 60, area);
        let heading = if self.register {
            " Create your account "
        } else {
            " Welcome back "
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(heading)
            .title_bottom(Line::from(" Tab Next field  Enter Submit ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [_, email, password, switch, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);
        self.email.render(frame, email);
        self.password.render(frame, password);

        let label = if self.register {
            "Already have an account? Log in"
        } else {
            "No account yet? Register"
        };
        let style = if self.focus == Focus::ModeSwitch {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Magenta)
        };
        frame.render_widget(Paragraph::new(Line::from(label).centered()).style(style), switch);
    }
}
