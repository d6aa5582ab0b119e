//! # AdminPanel Component
//!
//! The admin dashboard: global toggles, submitted questionnaires and baby
//! assignment.
//!
//! ```text
//! ┌ Controls ───────────────────────────────────────────┐
//! │ [v] Babies Visible    [l] Questionnaires Unlocked    │
//! ├ User Questionnaires ─────┬ Details ─────────────────┤
//! │ ▶ a@b.com                │ parenting style: Gentle   │
//! ├ Babies ──────────────────┤                           │
//! │   Lily → a@b.com         │                           │
//! └──────────────────────────┴───────────────────────────┘
//! ```
//!
//! Tab switches between the questionnaire and baby lists. On a baby, `a`
//! opens a user picker; Enter in the picker assigns.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::api::types::{QuestionnaireSummary, Role};
use crate::core::state::AdminPage;
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pane {
    #[default]
    Questionnaires,
    Babies,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminEvent {
    ToggleBabiesVisible,
    ToggleQuestionnaireLock,
    Assign { baby_id: i64, user_id: i64 },
    ViewPhoto(String),
}

#[derive(Debug, Default)]
pub struct AdminPanelState {
    pane: Pane,
    questionnaires: ListState,
    babies: ListState,
    /// Open while choosing who gets the selected baby.
    picker: Option<ListState>,
}

/// Users a baby can go to: regular accounts, or anyone who submitted a
/// questionnaire when the user list is unavailable.
pub fn assignable_users(page: &AdminPage) -> Vec<(i64, String)> {
    let users: Vec<(i64, String)> = page
        .users
        .iter()
        .filter(|u| u.role == Role::User)
        .map(|u| (u.id, u.email.clone()))
        .collect();
    if !users.is_empty() {
        return users;
    }
    page.questionnaires
        .iter()
        .map(|q| (q.user_id, q.email.clone()))
        .collect()
}

fn step(list: &mut ListState, len: usize, down: bool) {
    if len == 0 {
        list.select(None);
        return;
    }
    let next = match (list.selected(), down) {
        (None, _) => 0,
        (Some(i), true) => (i + 1).min(len - 1),
        (Some(i), false) => i.saturating_sub(1),
    };
    list.select(Some(next));
}

impl AdminPanelState {
    pub fn handle_event(&mut self, event: &TuiEvent, page: &AdminPage) -> Option<AdminEvent> {
        if let Some(picker) = self.picker.as_mut() {
            let users = assignable_users(page);
            return match event {
                TuiEvent::Escape => {
                    self.picker = None;
                    None
                }
                TuiEvent::CursorUp => {
                    step(picker, users.len(), false);
                    None
                }
                TuiEvent::CursorDown => {
                    step(picker, users.len(), true);
                    None
                }
                TuiEvent::Submit => {
                    let user_id = picker.selected().and_then(|i| users.get(i)).map(|u| u.0);
                    let baby_id = self
                        .babies
                        .selected()
                        .and_then(|i| page.babies.get(i))
                        .map(|b| b.id);
                    self.picker = None;
                    Some(AdminEvent::Assign {
                        baby_id: baby_id?,
                        user_id: user_id?,
                    })
                }
                _ => None,
            };
        }

        match event {
            TuiEvent::InputChar('v') => Some(AdminEvent::ToggleBabiesVisible),
            TuiEvent::InputChar('l') => Some(AdminEvent::ToggleQuestionnaireLock),
            TuiEvent::NextField | TuiEvent::PrevField => {
                self.pane = match self.pane {
                    Pane::Questionnaires => Pane::Babies,
                    Pane::Babies => Pane::Questionnaires,
                };
                None
            }
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let down = matches!(event, TuiEvent::CursorDown);
                match self.pane {
                    Pane::Questionnaires => {
                        step(&mut self.questionnaires, page.questionnaires.len(), down)
                    }
                    Pane::Babies => step(&mut self.babies, page.babies.len(), down),
                }
                None
            }
            TuiEvent::InputChar('a') if self.pane == Pane::Babies => {
                if self.babies.selected().is_some() && !assignable_users(page).is_empty() {
                    self.picker = Some(ListState::default().with_selected(Some(0)));
                }
                None
            }
            TuiEvent::Submit if self.pane == Pane::Questionnaires => self
                .selected_questionnaire(page)
                .and_then(|q| q.image_paths.first().cloned())
                .map(AdminEvent::ViewPhoto),
            _ => None,
        }
    }

    fn selected_questionnaire<'p>(&self, page: &'p AdminPage) -> Option<&'p QuestionnaireSummary> {
        self.questionnaires
            .selected()
            .and_then(|i| page.questionnaires.get(i))
    }
}

pub struct AdminPanel<'a> {
    state: &'a mut AdminPanelState,
    page: &'a AdminPage,
}

impl<'a> AdminPanel<'a> {
    pub fn new(state: &'a mut AdminPanelState, page: &'a AdminPage) -> Self {
        Self { state, page }
    }

    fn pane_block(&self, title: &'static str, pane: Pane) -> Block<'static> {
        let color = if self.state.pane == pane {
            Color::Magenta
        } else {
            Color::DarkGray
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [controls, body] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).areas(area);
        let [left, details] =
            Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                .areas(body);
        let [questionnaires, babies] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(left);

        self.render_controls(frame, controls);
        self.render_questionnaires(frame, questionnaires);
        self.render_babies(frame, babies);
        self.render_details(frame, details);

        if self.state.picker.is_some() {
            self.render_picker(frame, area);
        }
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
            if on {
                Span::styled(
                    on_text,
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(off_text, Style::default().fg(Color::Gray))
            }
        };
        let line = Line::from(vec![
            Span::raw("[v] "),
            toggle(self.page.babies_visible(), "Babies Visible", "Babies Hidden"),
            Span::raw("    [l] "),
            toggle(
                self.page.questionnaires_locked,
                "Questionnaires Locked",
                "Questionnaires Unlocked",
            ),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Controls ");
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_questionnaires(&mut self, frame: &mut Frame, area: Rect) {
        let block = self.pane_block(" User Questionnaires ", Pane::Questionnaires);
        if self.page.questionnaires.is_empty() {
            let text = if self.page.loaded {
                "No questionnaires submitted yet"
            } else {
                "Loading..."
            };
            frame.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
            return;
        }
        if self.state.questionnaires.selected().is_none() {
            self.state.questionnaires.select(Some(0));
        }
        let items: Vec<ListItem> = self
            .page
            .questionnaires
            .iter()
            .map(|q| ListItem::new(q.email.as_str()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.state.questionnaires);
    }

    fn render_babies(&mut self, frame: &mut Frame, area: Rect) {
        let block = self
            .pane_block(" Babies ", Pane::Babies)
            .title_bottom(Line::from(" a Assign ").centered());
        let items: Vec<ListItem> = self
            .page
            .babies
            .iter()
            .map(|b| {
                let owner = b
                    .user_id
                    .map(|id| {
                        self.page
                            .user_email(id)
                            .map_or_else(|| format!("user #{id}"), str::to_string)
                    })
                    .unwrap_or_else(|| "unassigned".to_string());
                ListItem::new(Line::from(vec![
                    Span::raw(b.name.as_str()),
                    Span::styled(format!(" → {owner}"), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        if self.state.babies.selected().is_none() && !items.is_empty() {
            self.state.babies.select(Some(0));
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.state.babies);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Details ");
        let Some(q) = self.state.selected_questionnaire(self.page) else {
            frame.render_widget(block, area);
            return;
        };

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(q.email.as_str(), bold)),
            Line::from(format!(
                "Last updated: {}",
                q.updated_at.as_deref().map_or("Never".to_string(), format_updated)
            )),
            Line::from(""),
        ];
        if !q.answers.is_empty() {
            lines.push(Line::from(Span::styled("Answers:", bold)));
            for (key, value) in &q.answers {
                let value = match value {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                        .collect::<Vec<_>>()
                        .join(", "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", key.replace('_', " ")), bold),
                    Span::raw(value),
                ]));
            }
        }
        if !q.image_paths.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Uploaded Images (Enter to view):", bold)));
            lines.extend(q.image_paths.iter().map(|p| Line::from(format!("  📷 {p}"))));
        }
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }

    fn render_picker(&mut self, frame: &mut Frame, area: Rect) {
        let baby = self
            .state
            .babies
            .selected()
            .and_then(|i| self.page.babies.get(i))
            .map_or("baby", |b| b.name.as_str());
        let overlay = centered_rect(50, 50, area);
        frame.render_widget(Clear, overlay);
        let items: Vec<ListItem> = assignable_users(self.page)
            .into_iter()
            .map(|(_, email)| ListItem::new(email))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Magenta))
                    .title(format!(" Assign {baby} to "))
                    .title_bottom(Line::from(" Enter Assign  Esc Cancel ").centered()),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        if let Some(picker) = self.state.picker.as_mut() {
            frame.render_stateful_widget(list, overlay, picker);
        }
    }
}

/// Server timestamps are RFC 3339; anything else is shown as sent.
fn format_updated(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}
