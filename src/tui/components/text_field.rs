//! # TextField Component
//!
//! Bordered text input used by every form: login, profile, questionnaire
//! free-text answers and the chat composer.
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `label`, `masked`, `focused`
//! and `multiline` are props set by the owning form.
//!
//! Cursor math works in display columns (via `unicode-width`) so wide
//! characters and emoji line up with what the terminal draws.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border + one column of padding on each side.
const HORIZONTAL_OVERHEAD: u16 = 4;
const BORDER_OFFSET: u16 = 1;
const MASK: char = '•';

#[derive(Debug, Clone, PartialEq)]
pub enum TextFieldEvent {
    /// Enter pressed; the buffer is left as is.
    Submit,
    Changed,
}

pub struct TextField {
    /// Text buffer (Internal State)
    buffer: String,
    /// Cursor position as byte offset in buffer
    cursor: usize,
    pub label: String,
    pub masked: bool,
    pub multiline: bool,
    pub focused: bool,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            label: label.into(),
            masked: false,
            multiline: false,
            focused: false,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Replaces the content and moves the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Takes the content, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Height needed to show all wrapped lines at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        if !self.multiline {
            return 3;
        }
        let lines = self.wrapped(inner_width(width)).len().max(1) as u16;
        lines + 2
    }

    fn display_text(&self) -> String {
        if self.masked {
            MASK.to_string().repeat(self.buffer.chars().count())
        } else {
            self.buffer.clone()
        }
    }

    fn wrapped(&self, width: u16) -> Vec<String> {
        if width == 0 {
            return vec![String::new()];
        }
        let text = self.display_text();
        let mut lines: Vec<String> = textwrap::wrap(&text, wrap_options(width))
            .into_iter()
            .map(|l| l.into_owned())
            .collect();
        if text.ends_with('\n') || lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// Cursor column and row relative to the content origin.
    fn cursor_offset(&self, width: u16) -> (u16, u16) {
        let before = &self.buffer[..self.cursor];
        let before = if self.masked {
            MASK.to_string().repeat(before.chars().count())
        } else {
            before.to_string()
        };
        if !self.multiline {
            return (before.width() as u16, 0);
        }
        let width = width.max(1);
        let lines = textwrap::wrap(&before, wrap_options(width));
        let mut row = lines.len().saturating_sub(1) as u16;
        let mut col = lines.last().map(|l| l.width()).unwrap_or(0) as u16;
        // textwrap drops trailing spaces and the empty line after a newline.
        let trailing_spaces = before.len() - before.trim_end_matches(' ').len();
        if before.ends_with('\n') {
            row += 1;
            col = 0;
        } else {
            col += trailing_spaces as u16;
        }
        if col >= width {
            row += col / width;
            col %= width;
        }
        (col, row)
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

fn inner_width(width: u16) -> u16 {
    width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Skips leading characters until the tail fits `width` columns.
fn tail_fitting(text: &str, width: usize) -> (&str, usize) {
    let mut skipped = 0;
    let mut start = 0;
    let mut total = text.width();
    for (i, c) in text.char_indices() {
        if total < width {
            break;
        }
        let w = c.width().unwrap_or(0);
        total -= w;
        skipped += w;
        start = i + c.len_utf8();
    }
    (&text[start..], skipped)
}

impl Component for TextField {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(self.label.as_str());
        let width = inner_width(area.width);

        let (text, cursor) = if self.multiline {
            (self.wrapped(width).join("\n"), self.cursor_offset(width))
        } else {
            // Single line: scroll horizontally so the cursor stays visible.
            let shown = self.display_text();
            let (col, _) = self.cursor_offset(width);
            let visible = usize::from(width.max(1));
            if usize::from(col) < visible {
                (shown, (col, 0))
            } else {
                let (tail, skipped) = tail_fitting(&shown, visible);
                (tail.to_string(), ((usize::from(col) - skipped) as u16, 0))
            }
        };

        let paragraph = Paragraph::new(text)
            .block(block.padding(ratatui::widgets::Padding::horizontal(1)))
            .style(Style::default().fg(Color::White));
        frame.render_widget(paragraph, area);

        if self.focused {
            let x = area.x + BORDER_OFFSET + 1 + cursor.0;
            let y = area.y + BORDER_OFFSET + cursor.1;
            if x < area.right() && y < area.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

impl EventHandler for TextField {
    type Event = TextFieldEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('\n') if !self.multiline => None,
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(TextFieldEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                let text = if self.multiline {
                    text.clone()
                } else {
                    text.replace(['\n', '\r'], " ")
                };
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(TextFieldEvent::Changed)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(TextFieldEvent::Changed)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                Some(TextFieldEvent::Changed)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                None
            }
            TuiEvent::Submit => Some(TextFieldEvent::Submit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(field: &mut TextField, s: &str) {
        for c in s.chars() {
            field.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_editing() {
        let mut field = TextField::new("Email");
        type_str(&mut field, "héllo");
        assert_eq!(field.value(), "héllo");

        field.handle_event(&TuiEvent::CursorLeft);
        field.handle_event(&TuiEvent::Backspace);
        assert_eq!(field.value(), "hélo");

        field.handle_event(&TuiEvent::CursorHome);
        field.handle_event(&TuiEvent::Delete);
        assert_eq!(field.value(), "élo");
    }

    #[test]
    fn test_single_line_drops_newlines() {
        let mut field = TextField::new("Email");
        assert_eq!(field.handle_event(&TuiEvent::InputChar('\n')), None);
        field.handle_event(&TuiEvent::Paste("a\nb".into()));
        assert_eq!(field.value(), "a b");
    }

    #[test]
    fn test_multiline_keeps_newlines_and_grows() {
        let mut field = TextField::new("Hobbies").multiline();
        type_str(&mut field, "one\ntwo\nthree");
        assert_eq!(field.height(40), 5);
    }

    #[test]
    fn test_submit_keeps_buffer() {
        let mut field = TextField::new("Message");
        type_str(&mut field, "hi");
        assert_eq!(
            field.handle_event(&TuiEvent::Submit),
            Some(TextFieldEvent::Submit)
        );
        assert_eq!(field.take(), "hi");
        assert_eq!(field.value(), "");
    }

    #[test]
    fn test_cursor_offset_counts_display_width() {
        let mut field = TextField::new("Name");
        type_str(&mut field, "宝宝");
        assert_eq!(field.cursor_offset(20), (4, 0));
    }

    #[test]
    fn test_masked_render_hides_text() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut field = TextField::new("Password").masked();
        type_str(&mut field, "secret");

        terminal.draw(|f| field.render(f, f.area())).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Password"));
        assert!(text.contains("••••••"));
        assert!(!text.contains("secret"));
    }
}
