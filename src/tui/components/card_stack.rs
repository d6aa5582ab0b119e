//! # CardStack Component
//!
//! Draws a [`Navigator`] over babies as a deck of cards: the active card in
//! front, up to two cards peeking out behind it, a swipe-direction overlay
//! while dragging, and a row of navigation dots.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `StackLayout` lives in `TuiState` and remembers where things were drawn
//!   so mouse events can be hit-tested on the next frame
//! - `CardStack` is created each frame with borrowed state
//!
//! The navigator's transforms are in gesture units. Horizontal offsets go
//! through [`PointerScale`]; one row is worth [`UNITS_PER_ROW`] vertically.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::api::types::Baby;
use crate::core::gesture::PointerScale;
use crate::core::navigator::{Direction, LOOKAHEAD, Mounted, Navigator, card_transform};

pub const UNITS_PER_ROW: f64 = 10.0;
const MAX_CARD_WIDTH: u16 = 44;
const ACTIVE_DOT: &str = "━━";
const DOT: &str = "•";

/// Where the stack was last drawn.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StackLayout {
    pub stack: Rect,
    pub active_card: Rect,
    pub dots: Vec<Rect>,
}

impl StackLayout {
    pub fn on_active_card(&self, col: u16, row: u16) -> bool {
        self.active_card.contains(Position::new(col, row))
    }

    pub fn dot_at(&self, col: u16, row: u16) -> Option<usize> {
        self.dots
            .iter()
            .position(|r| r.contains(Position::new(col, row)))
    }
}

/// Lays out one dot per card on `row`, centered. The active dot is wider.
pub fn dot_rects(count: usize, current: usize, row: Rect) -> Vec<Rect> {
    let widths: Vec<u16> = (0..count)
        .map(|i| if i == current { 2 } else { 1 })
        .collect();
    let total: u16 = widths.iter().sum::<u16>() + count.saturating_sub(1) as u16;
    let mut x = row.x + row.width.saturating_sub(total) / 2;
    widths
        .into_iter()
        .map(|w| {
            let rect = Rect::new(x, row.y, w, 1).intersection(row);
            x = x.saturating_add(w + 1);
            rect
        })
        .collect()
}

pub struct CardStack<'a> {
    navigator: &'a Navigator<Baby>,
    scale: PointerScale,
    layout: &'a mut StackLayout,
}

impl<'a> CardStack<'a> {
    pub fn new(
        navigator: &'a Navigator<Baby>,
        scale: PointerScale,
        layout: &'a mut StackLayout,
    ) -> Self {
        Self {
            navigator,
            scale,
            layout,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        *self.layout = StackLayout {
            stack: area,
            ..Default::default()
        };

        if self.navigator.is_empty() {
            let empty = Paragraph::new("No babies available yet. Check back later!")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, centered_row(area));
            return;
        }

        let [cards_area, dots_row] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let base_h = cards_area.height.saturating_sub(LOOKAHEAD as u16).max(3);
        let base_w = cards_area.width.min(MAX_CARD_WIDTH);
        let drag_offset = self.navigator.state().drag_offset;

        // Back to front so the active card is drawn last, on top.
        let mut mounted: Vec<Mounted<'_, Baby>> = self.navigator.mounted().collect();
        mounted.sort_by(|a, b| b.distance.cmp(&a.distance));

        for card in mounted {
            let t = card_transform(card.distance, drag_offset);
            let w = ((f64::from(base_w) * t.scale).round() as u16).max(3);
            let h = ((f64::from(base_h) * t.scale).round() as u16).max(3);
            let dx = self.scale.to_columns(t.translate_x);
            let dy = (t.translate_y / UNITS_PER_ROW).round() as u16;

            let center_x = i32::from(cards_area.x) + i32::from(cards_area.width) / 2;
            let x = (center_x - i32::from(w) / 2 + dx).max(i32::from(cards_area.x)) as u16;
            let bottom = cards_area.y + base_h + dy;
            let y = bottom.saturating_sub(h).max(cards_area.y);
            let rect = Rect::new(x, y, w, h).intersection(cards_area);
            if rect.is_empty() {
                continue;
            }

            frame.render_widget(Clear, rect);
            if card.distance == 0 {
                self.layout.active_card = rect;
                self.render_active(frame, rect, card.card, t.rotation);
            } else {
                render_behind(frame, rect, card.card);
            }
        }

        self.render_dots(frame, dots_row);
    }

    fn render_active(&self, frame: &mut Frame, rect: Rect, baby: &Baby, rotation: f64) {
        // Cells can't rotate; lean the title instead.
        let tilt = match rotation {
            r if r < 0.0 => "╲ ",
            r if r > 0.0 => "╱ ",
            _ => "",
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(Line::from(format!(" {tilt}{}, {} ", baby.name, baby.age)).bold());

        if let Some(direction) = self.navigator.pending_direction() {
            let (arrow, color) = match direction {
                Direction::Left => ("→", Color::Blue),
                Direction::Right => ("←", Color::Magenta),
            };
            let overlay = Paragraph::new(arrow)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(color).add_modifier(Modifier::BOLD))
                .block(block);
            frame.render_widget(overlay, rect);
            return;
        }

        let attributes = baby.attributes.join(" · ");
        let photo = if baby.image_path.is_empty() {
            "👶"
        } else {
            "👶  [v] view photo"
        };
        let body = vec![
            Line::from(""),
            Line::from(photo).centered(),
            Line::from(""),
            Line::from(Span::styled(attributes, Style::default().fg(Color::Magenta))),
            Line::from(""),
            Line::from(Span::styled(
                format!("[Enter] Meet {}", baby.name),
                Style::default().fg(Color::Black).bg(Color::Magenta),
            ))
            .centered(),
        ];
        let paragraph = Paragraph::new(body).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(paragraph, rect);
    }

    fn render_dots(&mut self, frame: &mut Frame, row: Rect) {
        let current = self.navigator.current_index();
        let rects = dot_rects(self.navigator.len(), current, row);
        for (i, rect) in rects.iter().enumerate() {
            let (symbol, style) = if i == current {
                (ACTIVE_DOT, Style::default().fg(Color::Magenta))
            } else {
                (DOT, Style::default().fg(Color::DarkGray))
            };
            frame.render_widget(Span::styled(symbol, style), *rect);
        }
        self.layout.dots = rects;
    }
}

fn render_behind(frame: &mut Frame, rect: Rect, baby: &Baby) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", baby.name),
            Style::default().fg(Color::DarkGray),
        ));
    frame.render_widget(block, rect);
}

fn centered_row(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::PointerEvent;
    use crate::test_support::baby;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(navigator: &Navigator<Baby>, layout: &mut StackLayout) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                CardStack::new(navigator, PointerScale::default(), layout).render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn three() -> Navigator<Baby> {
        Navigator::new(vec![baby(1, "Ava"), baby(2, "Ben"), baby(3, "Cal")])
    }

    #[test]
    fn test_empty_stack_message() {
        let mut layout = StackLayout::default();
        let text = draw(&Navigator::new(vec![]), &mut layout);
        assert!(text.contains("No babies available yet"));
        assert!(layout.dots.is_empty());
    }

    #[test]
    fn test_active_card_on_top() {
        let mut layout = StackLayout::default();
        let text = draw(&three(), &mut layout);
        assert!(text.contains("Ava, 6 months"));
        assert!(text.contains("Meet Ava"));
        assert_eq!(layout.dots.len(), 3);
        assert!(!layout.active_card.is_empty());
    }

    #[test]
    fn test_dot_hit_testing() {
        let mut layout = StackLayout::default();
        draw(&three(), &mut layout);
        let second = layout.dots[1];
        assert_eq!(layout.dot_at(second.x, second.y), Some(1));
        assert_eq!(layout.dot_at(0, 0), None);
    }

    #[test]
    fn test_drag_moves_active_card() {
        let mut nav = three();
        let mut layout = StackLayout::default();
        draw(&nav, &mut layout);
        let resting_x = layout.active_card.x;

        nav.handle_pointer(PointerEvent::Down(300.0));
        nav.handle_pointer(PointerEvent::Move(240.0));
        let text = draw(&nav, &mut layout);
        assert_eq!(layout.active_card.x, resting_x - 6);
        assert!(text.contains("→"), "left swipe shows the next-card arrow");
        assert!(text.contains("╲ Ava, 6 months"), "dragged card leans");

        nav.handle_pointer(PointerEvent::Move(330.0));
        let text = draw(&nav, &mut layout);
        assert!(text.contains("╱ Ava, 6 months"));

        nav.handle_pointer(PointerEvent::Up);
        let text = draw(&nav, &mut layout);
        assert!(!text.contains("╱") && !text.contains("╲"), "upright at rest");
    }

    #[test]
    fn test_dot_rects_centered() {
        let rects = dot_rects(3, 0, Rect::new(0, 5, 20, 1));
        // widths 2,1,1 plus two gaps = 6 columns, starting at (20 - 6) / 2
        assert_eq!(rects[0], Rect::new(7, 5, 2, 1));
        assert_eq!(rects[1], Rect::new(10, 5, 1, 1));
        assert_eq!(rects[2], Rect::new(12, 5, 1, 1));
    }
}
