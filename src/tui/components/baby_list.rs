//! # BabyList Component
//!
//! The "My Babies" page: babies the user selected or chatted with.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::api::types::Baby;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum BabyListEvent {
    Chat(Baby),
    ViewPhoto(Baby),
    Browse,
}

#[derive(Debug, Default)]
pub struct BabyListState {
    pub list_state: ListState,
}

impl BabyListState {
    fn selected<'a>(&self, babies: &'a [Baby]) -> Option<&'a Baby> {
        self.list_state.selected().and_then(|i| babies.get(i))
    }

    pub fn handle_event(&mut self, event: &TuiEvent, babies: &[Baby]) -> Option<BabyListEvent> {
        if self.list_state.selected().is_none() && !babies.is_empty() {
            self.list_state.select(Some(0));
        }
        match event {
            TuiEvent::CursorUp => {
                self.list_state.select_previous();
                None
            }
            TuiEvent::CursorDown => {
                let next = self.list_state.selected().map_or(0, |i| i + 1);
                self.list_state
                    .select(Some(next.min(babies.len().saturating_sub(1))));
                None
            }
            TuiEvent::Submit | TuiEvent::InputChar('c') => {
                self.selected(babies).cloned().map(BabyListEvent::Chat)
            }
            TuiEvent::InputChar('v') => self
                .selected(babies)
                .filter(|b| !b.image_path.is_empty())
                .cloned()
                .map(BabyListEvent::ViewPhoto),
            TuiEvent::InputChar('b') => Some(BabyListEvent::Browse),
            _ => None,
        }
    }
}

pub struct BabyList<'a> {
    state: &'a mut BabyListState,
    babies: &'a [Baby],
    visible: bool,
}

impl<'a> BabyList<'a> {
    pub fn new(state: &'a mut BabyListState, babies: &'a [Baby], visible: bool) -> Self {
        Self {
            state,
            babies,
            visible,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Babies you've selected or interacted with ")
            .title_bottom(Line::from(" Enter Chat  v Photo  b Browse Babies ").centered())
            .padding(Padding::horizontal(1));

        let empty_text = if !self.visible {
            Some("Baby viewing is currently disabled by the admin.")
        } else if self.babies.is_empty() {
            Some("You haven't selected or interacted with any babies yet. Press b to browse.")
        } else {
            None
        };
        if let Some(text) = empty_text {
            let empty = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .babies
            .iter()
            .map(|baby| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            baby.name.as_str(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", baby.age),
                            Style::default().fg(Color::Gray),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", baby.attributes.join(" · ")),
                        Style::default().fg(Color::Magenta),
                    )),
                ])
            })
            .collect();
        if self.state.list_state.selected().is_none() {
            self.state.list_state.select(Some(0));
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
