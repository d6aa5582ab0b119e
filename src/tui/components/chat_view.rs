//! # ChatView Component
//!
//! A conversation with one baby: scrolling transcript, remaining-message
//! counter and a composer at the bottom.
//!
//! The transcript follows the newest message until the user scrolls up;
//! scrolling back to the end re-pins it.
//!
//! Ctrl+S (or `s` once the limit is reached) asks to make this baby the
//! final selection. The choice can't be undone, so it goes through a
//! confirmation prompt first.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::types::{ChatMessage, ChatRole};
use crate::core::chat::{Conversation, MESSAGE_LIMIT};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::components::text_field::{TextField, TextFieldEvent};
use crate::tui::event::TuiEvent;

/// Bubble indent from the opposite edge.
const BUBBLE_MARGIN: u16 = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Send(String),
    Select,
    Back,
}

pub struct ChatViewState {
    pub scroll_state: ScrollViewState,
    pub composer: TextField,
    pub stick_to_bottom: bool,
    pub confirming: bool,
}

impl Default for ChatViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatViewState {
    pub fn new() -> Self {
        let mut composer = TextField::new(" Message ").multiline();
        composer.focused = true;
        Self {
            scroll_state: ScrollViewState::default(),
            composer,
            stick_to_bottom: true,
            confirming: false,
        }
    }

    /// Input handling once the conversation is capped: the composer is gone,
    /// so plain `s` starts the selection too.
    pub fn handle_capped_event(&mut self, event: &TuiEvent) -> Option<ChatEvent> {
        match event {
            TuiEvent::InputChar('s') if !self.confirming => {
                self.confirming = true;
                None
            }
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) | TuiEvent::Backspace
                if !self.confirming =>
            {
                None
            }
            _ => self.handle_event(event),
        }
    }

    /// Puts text from a failed send back into the composer, unless the
    /// user has already started typing something new.
    pub fn restore(&mut self, text: String) {
        if self.composer.value().is_empty() {
            self.composer.set_value(text);
        }
    }
}

impl EventHandler for ChatViewState {
    type Event = ChatEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ChatEvent> {
        if self.confirming {
            return match event {
                TuiEvent::Submit | TuiEvent::InputChar('y') => {
                    self.confirming = false;
                    Some(ChatEvent::Select)
                }
                TuiEvent::Escape | TuiEvent::InputChar('n') => {
                    self.confirming = false;
                    None
                }
                _ => None,
            };
        }
        match event {
            TuiEvent::Escape => Some(ChatEvent::Back),
            TuiEvent::Commit => {
                self.confirming = true;
                None
            }
            TuiEvent::ScrollUp | TuiEvent::CursorUp => {
                self.stick_to_bottom = false;
                self.scroll_state.scroll_up();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.stick_to_bottom = false;
                self.scroll_state.scroll_page_up();
                None
            }
            TuiEvent::ScrollDown | TuiEvent::CursorDown => {
                self.scroll_state.scroll_down();
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                None
            }
            _ => match self.composer.handle_event(event)? {
                TextFieldEvent::Submit if !self.composer.value().trim().is_empty() => {
                    self.stick_to_bottom = true;
                    Some(ChatEvent::Send(self.composer.take()))
                }
                _ => None,
            },
        }
    }
}

fn bubble_width(area_width: u16) -> u16 {
    area_width.saturating_sub(BUBBLE_MARGIN + 1).max(10)
}

fn bubble_height(text: &str, width: u16) -> u16 {
    // Label line + wrapped text + spacer.
    let lines = textwrap::wrap(text, usize::from(width.max(1))).len().max(1);
    lines as u16 + 2
}

fn label(chat: &Conversation, message: &ChatMessage) -> String {
    match message.role {
        ChatRole::User => "You".to_string(),
        ChatRole::Assistant => chat.baby.name.clone(),
    }
}

fn render_bubble(
    scroll_view: &mut ScrollView,
    y: u16,
    content_width: u16,
    label: &str,
    text: &str,
    role: ChatRole,
) -> u16 {
    let width = bubble_width(content_width);
    let height = bubble_height(text, width);
    let (x, color) = match role {
        ChatRole::User => (content_width.saturating_sub(width), Color::Magenta),
        ChatRole::Assistant => (0, Color::Cyan),
    };
    let body = vec![
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(text.to_string()),
    ];
    scroll_view.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: false }),
        Rect::new(x, y, width, height - 1),
    );
    height
}

pub struct ChatView<'a> {
    state: &'a mut ChatViewState,
    chat: &'a Conversation,
}

impl<'a> ChatView<'a> {
    pub fn new(state: &'a mut ChatViewState, chat: &'a Conversation) -> Self {
        Self { state, chat }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let counter = if self.chat.limit_reached {
            Span::styled(
                "Message limit reached",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                format!(
                    "{} of {} messages remaining",
                    self.chat.remaining(),
                    MESSAGE_LIMIT
                ),
                Style::default().fg(Color::Gray),
            )
        };
        let header = Line::from(vec![
            Span::styled(
                self.chat.title(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            counter,
        ]);
        frame.render_widget(header, area);
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let chat = self.chat;
        let content_width = area.width.saturating_sub(1);
        let width = bubble_width(content_width);

        let mut entries: Vec<(String, &str, ChatRole)> = chat
            .messages
            .iter()
            .map(|m| (label(chat, m), m.message.as_str(), m.role))
            .collect();
        if let Some(pending) = &chat.pending {
            entries.push(("You".to_string(), pending.as_str(), ChatRole::User));
            entries.push((chat.baby.name.clone(), "is typing...", ChatRole::Assistant));
        }

        if entries.is_empty() {
            let hint = if chat.loaded {
                format!("Say hello to {}!", chat.baby.name)
            } else {
                "Loading conversation...".to_string()
            };
            frame.render_widget(
                Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }

        let total: u16 = entries
            .iter()
            .map(|(_, text, _)| bubble_height(text, width))
            .sum();
        let mut scroll_view = ScrollView::new(Size::new(content_width, total))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0;
        for (label, text, role) in &entries {
            y += render_bubble(&mut scroll_view, y, content_width, label, text, *role);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else if self.state.scroll_state.offset().y + area.height >= total {
            // Scrolled back down to the end.
            self.state.stick_to_bottom = true;
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let composer_height = if self.chat.limit_reached {
            3
        } else {
            self.state.composer.height(area.width).min(8)
        };
        let [header, transcript, composer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(composer_height),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_transcript(frame, transcript);

        if self.chat.limit_reached {
            let notice = Paragraph::new(vec![
                Line::from(format!(
                    "You've used all {MESSAGE_LIMIT} messages in this conversation."
                )),
                Line::from(format!(
                    "Press s to select {} as your final choice.",
                    self.chat.baby.name
                )),
            ])
            .style(Style::default().fg(Color::Yellow));
            frame.render_widget(notice, composer);
        } else {
            self.state.composer.focused = self.chat.can_send() && !self.state.confirming;
            self.state.composer.render(frame, composer);
        }

        if self.state.confirming {
            self.render_confirmation(frame, area);
        }
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 40, area);
        frame.render_widget(Clear, overlay);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Final Decision ")
            .title_bottom(Line::from(" Enter Confirm  Esc Cancel ").centered())
            .padding(Padding::uniform(1));
        let text = format!(
            "Are you sure you want to select {}? This is your final decision and cannot be changed.",
            self.chat.baby.name
        );
        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
            overlay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ChatHistory;
    use crate::test_support::baby;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn message(role: ChatRole, text: &str) -> ChatMessage {
        ChatMessage {
            message: text.to_string(),
            role,
            timestamp: None,
        }
    }

    fn draw(state: &mut ChatViewState, chat: &Conversation) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| ChatView::new(state, chat).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_submit_sends_trimmed_input_and_clears() {
        let mut state = ChatViewState::new();
        assert_eq!(state.handle_event(&TuiEvent::Submit), None, "blank input");
        state.handle_event(&TuiEvent::Paste("hi there".into()));
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ChatEvent::Send("hi there".into()))
        );
        assert_eq!(state.composer.value(), "");
    }

    #[test]
    fn test_restore_does_not_clobber_new_text() {
        let mut state = ChatViewState::new();
        state.restore("lost".into());
        assert_eq!(state.composer.value(), "lost");
        state.composer.set_value("newer");
        state.restore("lost".into());
        assert_eq!(state.composer.value(), "newer");
    }

    #[test]
    fn test_transcript_and_counter() {
        let mut chat = Conversation::new(baby(1, "Lily"), None);
        chat.apply_history(ChatHistory {
            messages: vec![
                message(ChatRole::User, "Hello Lily"),
                message(ChatRole::Assistant, "Hi! I like blocks"),
            ],
            message_count: 2,
        });
        let text = draw(&mut ChatViewState::new(), &chat);
        assert!(text.contains("Chat with Lily"));
        assert!(text.contains("18 of 20 messages remaining"));
        assert!(text.contains("Hello Lily"));
        assert!(text.contains("I like blocks"));
    }

    #[test]
    fn test_limit_reached_hides_composer() {
        let mut chat = Conversation::new(baby(1, "Lily"), None);
        chat.apply_history(ChatHistory {
            messages: vec![],
            message_count: MESSAGE_LIMIT,
        });
        let text = draw(&mut ChatViewState::new(), &chat);
        assert!(text.contains("Message limit reached"));
        assert!(text.contains("You've used all 20 messages"));
        assert!(text.contains("Say hello to Lily!"));
    }

    #[test]
    fn test_select_needs_confirmation() {
        let mut state = ChatViewState::new();
        assert_eq!(state.handle_event(&TuiEvent::Commit), None);
        assert!(state.confirming);
        assert_eq!(state.handle_event(&TuiEvent::Escape), None, "cancel, not back");
        assert!(!state.confirming);

        state.handle_event(&TuiEvent::Commit);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ChatEvent::Select)
        );
        assert!(!state.confirming);
    }

    #[test]
    fn test_capped_conversation_selects_with_s() {
        let mut chat = Conversation::new(baby(1, "Lily"), None);
        chat.apply_history(ChatHistory {
            messages: vec![],
            message_count: MESSAGE_LIMIT,
        });
        let mut state = ChatViewState::new();
        assert_eq!(state.handle_capped_event(&TuiEvent::InputChar('x')), None);
        assert_eq!(state.composer.value(), "");
        state.handle_capped_event(&TuiEvent::InputChar('s'));
        let text = draw(&mut state, &chat);
        assert!(text.contains("Final Decision"));
        assert_eq!(
            state.handle_capped_event(&TuiEvent::InputChar('y')),
            Some(ChatEvent::Select)
        );
    }

    #[test]
    fn test_scrolling_up_unpins() {
        let mut state = ChatViewState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
    }
}
