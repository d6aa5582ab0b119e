//! # QuestionnaireForm Component
//!
//! The questionnaire as a scrolling list of rows: a heading per question,
//! one row per choice, an inline editor per free-text answer, then the
//! uploaded photos and a path field for uploading another.
//!
//! ```text
//! What's your parenting style?      ← heading (not focusable)
//!   (•) Gentle                      ← Space/Enter chooses
//!   ( ) Structured
//! Which traits ...?
//!   [x] Smart & Curious             ← Space/Enter toggles
//! ╭ What are your hobbies? ╮        ← typing edits the answer
//! ```
//!
//! Every change is emitted as an [`AnswerEdit`]; the reducer applies it
//! and arms the autosave. While the admin lock is on, edits are not even
//! emitted and the editors stay read-only.

use std::path::PathBuf;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::questionnaire::{AnswerEdit, FIELDS, Field, FieldKind, Questionnaire};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_field::{TextField, TextFieldEvent};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Heading(&'static Field),
    Choice {
        field: &'static Field,
        option: &'static str,
    },
    /// Index into `QuestionnaireForm::editors`.
    Text(usize),
    Photo(usize),
    Upload,
}

impl Row {
    fn focusable(&self) -> bool {
        !matches!(self, Row::Heading(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionnaireEvent {
    Edit(AnswerEdit),
    Upload(PathBuf),
    ViewPhoto(String),
}

pub struct QuestionnaireForm {
    editors: Vec<(&'static str, TextField)>,
    upload: TextField,
    photos: Vec<String>,
    locked: bool,
    /// Index into `rows()`.
    focus: usize,
    /// First row drawn last frame.
    scroll: usize,
    synced: bool,
}

impl Default for QuestionnaireForm {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionnaireForm {
    pub fn new() -> Self {
        let editors = FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .map(|f| (f.key, TextField::new(format!(" {} ", f.label)).multiline()))
            .collect();
        let mut form = Self {
            editors,
            upload: TextField::new(" Upload a photo: path to a png/jpg/gif, max 1MB "),
            photos: Vec::new(),
            locked: false,
            focus: 0,
            scroll: 0,
            synced: false,
        };
        form.focus = form.first_focusable(0).unwrap_or(0);
        form.sync_focus();
        form
    }

    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut text = 0;
        for field in FIELDS {
            match field.kind {
                FieldKind::Single(options) | FieldKind::Multi(options) => {
                    rows.push(Row::Heading(field));
                    rows.extend(options.iter().map(|&option| Row::Choice { field, option }));
                }
                FieldKind::Text => {
                    rows.push(Row::Text(text));
                    text += 1;
                }
            }
        }
        rows.extend((0..self.photos.len()).map(Row::Photo));
        rows.push(Row::Upload);
        rows
    }

    fn first_focusable(&self, from: usize) -> Option<usize> {
        self.rows()
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, r)| r.focusable())
            .map(|(i, _)| i)
    }

    fn focused_row(&self) -> Option<Row> {
        self.rows().get(self.focus).copied()
    }

    fn sync_focus(&mut self) {
        let focused = self.focused_row();
        for (i, (_, editor)) in self.editors.iter_mut().enumerate() {
            editor.focused = focused == Some(Row::Text(i));
        }
        self.upload.focused = focused == Some(Row::Upload);
    }

    fn move_focus(&mut self, forward: bool) {
        let rows = self.rows();
        let mut i = self.focus;
        loop {
            i = if forward {
                (i + 1) % rows.len()
            } else {
                (i + rows.len() - 1) % rows.len()
            };
            if rows[i].focusable() || i == self.focus {
                break;
            }
        }
        self.focus = i;
        self.sync_focus();
    }

    /// Pulls server state into the editors.
    ///
    /// Text answers are copied once per load so typing isn't overwritten by
    /// the form's own autosaves coming back.
    pub fn sync(&mut self, questionnaire: &Questionnaire) {
        self.locked = questionnaire.locked;
        self.photos = questionnaire.image_paths.clone();
        if questionnaire.loaded && !self.synced {
            for (key, editor) in &mut self.editors {
                editor.set_value(questionnaire.text(key));
            }
            self.synced = true;
        }
        let last = self.rows().len().saturating_sub(1);
        self.focus = self.focus.min(last);
        self.sync_focus();
    }

    fn row_height(&self, row: Row, width: u16) -> u16 {
        match row {
            Row::Text(i) => self.editors[i].1.height(width),
            Row::Upload => 3,
            Row::Heading(_) => 2,
            Row::Choice { .. } | Row::Photo(_) => 1,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, questionnaire: &Questionnaire) {
        let banner_height = if questionnaire.locked { 3 } else { 1 };
        let [banner, body] =
            Layout::vertical([Constraint::Length(banner_height), Constraint::Min(1)]).areas(area);
        render_banner(frame, banner, questionnaire);

        let rows = self.rows();
        let heights: Vec<u16> = rows.iter().map(|r| self.row_height(*r, body.width)).collect();

        // Keep the focused row on screen.
        if self.focus < self.scroll {
            self.scroll = self.focus;
            // Show the question above its first choice.
            if self.scroll > 0 && matches!(rows[self.scroll - 1], Row::Heading(_)) {
                self.scroll -= 1;
            }
        }
        while self.scroll < self.focus
            && heights[self.scroll..=self.focus].iter().sum::<u16>() > body.height
        {
            self.scroll += 1;
        }

        let mut y = body.y;
        for (i, row) in rows.iter().enumerate().skip(self.scroll) {
            let h = heights[i];
            if y + h > body.bottom() {
                break;
            }
            let rect = Rect::new(body.x, y, body.width, h);
            self.render_row(frame, rect, *row, i == self.focus, questionnaire);
            y += h;
        }
    }

    fn render_row(
        &mut self,
        frame: &mut Frame,
        rect: Rect,
        row: Row,
        focused: bool,
        questionnaire: &Questionnaire,
    ) {
        let highlight = |style: Style| {
            if focused {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            }
        };
        match row {
            Row::Heading(field) => {
                let heading = Line::from(Span::styled(
                    field.label,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                frame.render_widget(Paragraph::new(vec![Line::from(""), heading]), rect);
            }
            Row::Choice { field, option } => {
                let mark = match field.kind {
                    FieldKind::Multi(_) if questionnaire.is_checked(field.key, option) => "[x]",
                    FieldKind::Multi(_) => "[ ]",
                    _ if questionnaire.choice(field.key) == Some(option) => "(•)",
                    _ => "( )",
                };
                let style = highlight(Style::default().fg(Color::Gray));
                frame.render_widget(Span::styled(format!("  {mark} {option}"), style), rect);
            }
            Row::Text(i) => self.editors[i].1.render(frame, rect),
            Row::Photo(i) => {
                let name = self.photos.get(i).map(String::as_str).unwrap_or_default();
                let style = highlight(Style::default().fg(Color::Cyan));
                frame.render_widget(
                    Span::styled(format!("  📷 {name}  (Enter to view)"), style),
                    rect,
                );
            }
            Row::Upload => self.upload.render(frame, rect),
        }
    }
}

fn render_banner(frame: &mut Frame, area: Rect, questionnaire: &Questionnaire) {
    let progress = format!("Answered {}/{}", questionnaire.answered(), FIELDS.len());
    let saved = if questionnaire.saving {
        Span::styled("Saving...", Style::default().fg(Color::Blue))
    } else if let Some(at) = questionnaire.last_saved {
        Span::styled(
            format!("Last saved: {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::raw("")
    };
    let mut lines = Vec::new();
    if questionnaire.locked {
        lines.push(Line::from(Span::styled(
            "Questionnaire Locked: the admin has locked questionnaire editing.",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "You can view your answers but cannot make changes at this time.",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(vec![Span::raw(progress), Span::raw("  "), saved]));
    frame.render_widget(Paragraph::new(lines), area);
}

impl EventHandler for QuestionnaireForm {
    type Event = QuestionnaireEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<QuestionnaireEvent> {
        match event {
            TuiEvent::NextField | TuiEvent::CursorDown => {
                self.move_focus(true);
                return None;
            }
            TuiEvent::PrevField | TuiEvent::CursorUp => {
                self.move_focus(false);
                return None;
            }
            _ => {}
        }
        match self.focused_row()? {
            Row::Heading(_) => None,
            Row::Choice { field, option } => {
                if self.locked || !matches!(event, TuiEvent::Submit | TuiEvent::InputChar(' ')) {
                    return None;
                }
                let edit = match field.kind {
                    FieldKind::Multi(_) => AnswerEdit::Toggle {
                        key: field.key,
                        option,
                    },
                    _ => AnswerEdit::Choose {
                        key: field.key,
                        option,
                    },
                };
                Some(QuestionnaireEvent::Edit(edit))
            }
            Row::Text(i) => {
                if self.locked {
                    return None;
                }
                let (key, editor) = &mut self.editors[i];
                match editor.handle_event(event)? {
                    TextFieldEvent::Changed => Some(QuestionnaireEvent::Edit(AnswerEdit::Text {
                        key: *key,
                        value: editor.value().to_string(),
                    })),
                    TextFieldEvent::Submit => {
                        self.move_focus(true);
                        None
                    }
                }
            }
            Row::Photo(i) => match event {
                TuiEvent::Submit => self.photos.get(i).cloned().map(QuestionnaireEvent::ViewPhoto),
                _ => None,
            },
            Row::Upload => {
                if self.locked {
                    return None;
                }
                match self.upload.handle_event(event)? {
                    TextFieldEvent::Submit => {
                        let path = self.upload.take();
                        let path = path.trim();
                        (!path.is_empty()).then(|| QuestionnaireEvent::Upload(PathBuf::from(path)))
                    }
                    TextFieldEvent::Changed => None,
                }
            }
        }
    }
}
