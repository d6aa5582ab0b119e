//! # ProfileForm Component
//!
//! Account details, the partner email and the change-password form.
//! Enter in the partner field saves it; Enter in any password field submits
//! the password change.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::core::state::ProfilePage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{TextField, TextFieldEvent};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    SavePartner(String),
    ChangePassword {
        current: String,
        new: String,
        confirm: String,
    },
}

pub struct ProfileForm {
    fields: [TextField; 4],
    focus: usize,
    /// Partner field has been filled from the server once.
    partner_loaded: bool,
}

const PARTNER: usize = 0;

impl Default for ProfileForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileForm {
    pub fn new() -> Self {
        let mut form = Self {
            fields: [
                TextField::new(" Partner's email "),
                TextField::new(" Current password ").masked(),
                TextField::new(" New password ").masked(),
                TextField::new(" Confirm new password ").masked(),
            ],
            focus: PARTNER,
            partner_loaded: false,
        };
        form.sync_focus();
        form
    }

    fn sync_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.focused = i == self.focus;
        }
    }

    /// Prefills the partner field the first time profile data arrives.
    pub fn sync(&mut self, page: &ProfilePage) {
        if self.partner_loaded {
            return;
        }
        if let Some(me) = &page.me {
            self.fields[PARTNER].set_value(me.partner.clone().unwrap_or_default());
            self.partner_loaded = true;
        }
    }

    /// Empties the password fields after a successful change.
    pub fn clear_passwords(&mut self) {
        for field in &mut self.fields[1..] {
            field.clear();
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, page: &ProfilePage) {
        let [account, partner_title, partner, password_title, current, new, confirm, message] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .areas(area);

        let heading = Style::default().add_modifier(Modifier::BOLD);
        let (email, role) = page
            .me
            .as_ref()
            .map(|me| (me.email.clone(), format!("{:?}", me.role)))
            .unwrap_or_else(|| ("Loading...".to_string(), String::new()));
        let info = vec![
            Line::from(Span::styled("Account Information", heading)),
            Line::from(vec![Span::styled("Email: ", heading), Span::raw(email)]),
            Line::from(vec![Span::styled("Role: ", heading), Span::raw(role)]),
        ];
        frame.render_widget(Paragraph::new(info).block(Block::default()), account);

        frame.render_widget(Span::styled("Partner Information", heading), partner_title);
        self.fields[0].render(frame, partner);
        frame.render_widget(Span::styled("Change Password", heading), password_title);
        self.fields[1].render(frame, current);
        self.fields[2].render(frame, new);
        self.fields[3].render(frame, confirm);

        let line = match (&page.error, &page.notice) {
            (Some(error), _) => {
                Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)))
            }
            (None, Some(notice)) => {
                Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Green)))
            }
            (None, None) => Line::from(Span::styled(
                "Tab Next field  Enter Save",
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(line), message);
    }
}

impl EventHandler for ProfileForm {
    type Event = ProfileEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ProfileEvent> {
        match event {
            TuiEvent::NextField | TuiEvent::CursorDown => {
                self.focus = (self.focus + 1) % self.fields.len();
                self.sync_focus();
                None
            }
            TuiEvent::PrevField | TuiEvent::CursorUp => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                self.sync_focus();
                None
            }
            _ => match self.fields[self.focus].handle_event(event) {
                Some(TextFieldEvent::Submit) if self.focus == PARTNER => Some(
                    ProfileEvent::SavePartner(self.fields[PARTNER].value().to_string()),
                ),
                Some(TextFieldEvent::Submit) => Some(ProfileEvent::ChangePassword {
                    current: self.fields[1].value().to_string(),
                    new: self.fields[2].value().to_string(),
                    confirm: self.fields[3].value().to_string(),
                }),
                _ => None,
            },
        }
    }
}
