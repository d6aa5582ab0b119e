//! # LifeStages Overlay
//!
//! Shown after "Meet" on a baby that has life stages. The stages are fanned
//! out like a hand of cards; hovering (mouse or ←/→) straightens and lifts
//! one. From here the user chats with the baby at that age, views the stage
//! photo, or selects the baby.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::api::types::{Baby, LifeStage};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

/// Fan geometry, in the same units a pointer would use.
const SPREAD_X: f64 = 40.0;
const DROP_Y: f64 = 10.0;
const LIFT_Y: f64 = -20.0;
const TILT_DEG: f64 = 15.0;
/// Terminal conversion for the vertical fan units.
const UNITS_PER_ROW: f64 = 10.0;
const CARD_WIDTH: u16 = 24;
const CARD_HEIGHT: u16 = 9;
/// Narrowest slot that still leaves a covered card's title readable.
const MIN_SLOT_COLUMNS: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanSlot {
    pub rotation: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    pub z: i32,
}

/// Places `count` cards around the center. The hovered card sits upright,
/// raised and in front; the rest tilt and drop with distance from center.
pub fn fan_layout(count: usize, hovered: Option<usize>) -> Vec<FanSlot> {
    let center = (count as f64 - 1.0) / 2.0;
    (0..count)
        .map(|i| {
            let offset = i as f64 - center;
            if hovered == Some(i) {
                FanSlot {
                    rotation: 0.0,
                    translate_x: 0.0,
                    translate_y: LIFT_Y,
                    scale: 1.05,
                    z: 10,
                }
            } else {
                FanSlot {
                    rotation: offset * TILT_DEG,
                    translate_x: offset * SPREAD_X,
                    translate_y: offset.abs() * DROP_Y,
                    scale: 1.0,
                    z: 5 - offset.abs() as i32,
                }
            }
        })
        .collect()
}

/// Columns between neighbouring cards: a full card width when the fan fits,
/// otherwise squeezed to fit `width`, but never below [`MIN_SLOT_COLUMNS`].
fn slot_columns(count: usize, width: u16) -> f64 {
    let full = f64::from(CARD_WIDTH + 1);
    if count < 2 {
        return full;
    }
    let room = f64::from(width.saturating_sub(CARD_WIDTH)) / (count - 1) as f64;
    room.min(full).max(f64::from(MIN_SLOT_COLUMNS))
}

pub struct LifeStagesState {
    pub baby: Baby,
    pub hovered: Option<usize>,
    /// Drawn card rects in paint order, for hit testing.
    card_rects: Vec<(usize, Rect)>,
}

pub enum LifeStagesEvent {
    Chat(LifeStage),
    Select,
    ViewImage(String),
    Dismiss,
}

impl LifeStagesState {
    pub fn new(baby: Baby) -> Self {
        let hovered = (!baby.life_stages.is_empty()).then_some(0);
        Self {
            baby,
            hovered,
            card_rects: Vec::new(),
        }
    }

    fn stage_at(&self, col: u16, row: u16) -> Option<usize> {
        // Topmost first.
        self.card_rects
            .iter()
            .rev()
            .find(|(_, r)| r.contains(Position::new(col, row)))
            .map(|(i, _)| *i)
    }

    fn hovered_stage(&self) -> Option<&LifeStage> {
        self.hovered.and_then(|i| self.baby.life_stages.get(i))
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<LifeStagesEvent> {
        let count = self.baby.life_stages.len();
        match event {
            TuiEvent::Escape => Some(LifeStagesEvent::Dismiss),
            TuiEvent::CursorLeft if count > 0 => {
                self.hovered = Some(self.hovered.map_or(0, |i| i.saturating_sub(1)));
                None
            }
            TuiEvent::CursorRight if count > 0 => {
                self.hovered = Some(self.hovered.map_or(0, |i| (i + 1).min(count - 1)));
                None
            }
            TuiEvent::MouseMove(col, row) => {
                self.hovered = self.stage_at(*col, *row);
                None
            }
            TuiEvent::MouseDown(col, row) => self
                .stage_at(*col, *row)
                .and_then(|i| self.baby.life_stages.get(i))
                .map(|stage| LifeStagesEvent::Chat(stage.clone())),
            TuiEvent::Submit => self
                .hovered_stage()
                .map(|stage| LifeStagesEvent::Chat(stage.clone())),
            TuiEvent::InputChar('s') => Some(LifeStagesEvent::Select),
            TuiEvent::InputChar('v') => self
                .hovered_stage()
                .filter(|s| !s.image_path.is_empty())
                .map(|s| LifeStagesEvent::ViewImage(s.image_path.clone())),
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(90, 80, area);
        frame.render_widget(Clear, overlay);

        let name = &self.baby.name;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" Meet {name} at Different Ages "))
            .title_alignment(Alignment::Center)
            .title_bottom(
                Line::from(format!(
                    " ←/→ Browse  Enter Chat  v Photo  s Select {name} as My Baby  Esc Back "
                ))
                .centered(),
            );
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let count = self.baby.life_stages.len();
        let slots = fan_layout(count, self.hovered);
        // A hovered card keeps its column so its neighbours stay readable.
        let resting = fan_layout(count, None);
        let columns_per_unit = slot_columns(count, inner.width) / SPREAD_X;
        let mut order: Vec<usize> = (0..slots.len()).collect();
        order.sort_by_key(|&i| slots[i].z);

        let center_x = i32::from(inner.x) + i32::from(inner.width) / 2;
        let center_y = i32::from(inner.y) + i32::from(inner.height) / 2;
        self.card_rects.clear();

        for i in order {
            let slot = slots[i];
            let w = (f64::from(CARD_WIDTH) * slot.scale).round() as i32;
            let h = (f64::from(CARD_HEIGHT) * slot.scale).round() as i32;
            let dx = (resting[i].translate_x * columns_per_unit).round() as i32;
            let x = center_x - w / 2 + dx;
            let y = center_y - h / 2 + (slot.translate_y / UNITS_PER_ROW).round() as i32;
            let rect = Rect::new(
                x.max(i32::from(inner.x)) as u16,
                y.max(i32::from(inner.y)) as u16,
                w as u16,
                h as u16,
            )
            .intersection(inner);
            if rect.is_empty() {
                continue;
            }
            let stage = &self.baby.life_stages[i];
            render_stage(frame, rect, stage, slot, self.hovered == Some(i));
            self.card_rects.push((i, rect));
        }
    }
}

fn render_stage(frame: &mut Frame, rect: Rect, stage: &LifeStage, slot: FanSlot, hovered: bool) {
    let tilt = match slot.rotation {
        r if r < 0.0 => "╲ ",
        r if r > 0.0 => "╱ ",
        _ => "",
    };
    let border = if hovered {
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(format!(" {tilt}{} ", stage.age));
    let body = vec![
        Line::from(stage.description.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            format!("Chat at {}", stage.age),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )),
    ];
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: true }).block(block),
        rect,
    );
}
