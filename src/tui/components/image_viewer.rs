//! # Image Viewer
//!
//! Modal for a single photo. A terminal can't draw the picture itself, so
//! the modal shows the caption and the resolved URL to open elsewhere.
//! Any key or click closes it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageViewerState {
    pub url: String,
    pub caption: String,
}

impl ImageViewerState {
    pub fn new(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: caption.into(),
        }
    }

    /// True when the event should close the viewer.
    pub fn handle_event(&self, event: &TuiEvent) -> bool {
        !matches!(
            event,
            TuiEvent::MouseMove(..)
                | TuiEvent::MouseDrag(..)
                | TuiEvent::MouseUp(..)
                | TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::Resize
        )
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 40, area);
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" {} ", self.caption))
            .title_alignment(Alignment::Center)
            .title_bottom(Line::from(" any key / click to close ").centered())
            .padding(Padding::uniform(1));

        let body = vec![
            Line::from("👶").centered(),
            Line::from(""),
            Line::from(self.url.as_str())
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))
                .centered(),
        ];
        frame.render_widget(
            Paragraph::new(body).wrap(Wrap { trim: false }).block(block),
            overlay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_closes_on_any_key_or_click() {
        let viewer = ImageViewerState::new("http://x/a.png", "Lily");
        assert!(viewer.handle_event(&TuiEvent::Escape));
        assert!(viewer.handle_event(&TuiEvent::MouseDown(3, 3)));
        assert!(viewer.handle_event(&TuiEvent::InputChar('q')));
        assert!(!viewer.handle_event(&TuiEvent::MouseMove(3, 3)));
        assert!(!viewer.handle_event(&TuiEvent::Resize));
    }

    #[test]
    fn test_render_shows_caption_and_url() {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let viewer = ImageViewerState::new("http://x/a.png", "Lily at 5 years");
        terminal.draw(|f| viewer.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Lily at 5 years"));
        assert!(text.contains("http://x/a.png"));
    }
}
