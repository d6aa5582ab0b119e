//! # Card-Stack Navigator
//!
//! Swipeable stack of profile cards. Turns a horizontal drag into either a
//! move to a neighbouring card or a snap back.
//!
//! ```text
//!            begin_gesture(x)          update_gesture(x)
//!   Idle ─────────────────────▶ Dragging ◀──────────────┐
//!    ▲                              │  └─────────────────┘
//!    │        end_gesture()         │
//!    └──────────────────────────────┘
//!        |offset| <= 100   → snap back
//!        offset  >  100    → previous card (clamped at 0)
//!        offset  < -100    → next card (clamped at len - 1)
//! ```
//!
//! Two thresholds drive the interaction. Past [`DIRECTION_THRESHOLD`] the
//! active card shows which way it would go; only past [`COMMIT_THRESHOLD`]
//! does releasing actually move. Drags that land between the two preview a
//! direction and then snap back.
//!
//! Only the active card and up to [`LOOKAHEAD`] cards behind it are mounted.
//! Everything else is skipped without being visited.

use log::debug;

use crate::core::gesture::PointerEvent;

/// Drag distance past which the active card previews a direction.
pub const DIRECTION_THRESHOLD: f64 = 50.0;
/// Drag distance past which releasing changes the active card.
pub const COMMIT_THRESHOLD: f64 = 100.0;
/// Cards kept mounted behind the active one.
pub const LOOKAHEAD: usize = 2;

/// Which way the active card is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the list ("next").
    Left,
    /// Toward the start of the list ("previous").
    Right,
}

/// Mutable navigation state. Created fresh with every navigator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigatorState {
    pub current_index: usize,
    /// Only meaningful while `drag_active`; zero otherwise.
    pub drag_offset: f64,
    pub drag_active: bool,
    start_x: f64,
}

impl NavigatorState {
    /// Derived from `drag_offset` on every call, never stored.
    pub fn pending_direction(&self) -> Option<Direction> {
        if !self.drag_active {
            return None;
        }
        if self.drag_offset > DIRECTION_THRESHOLD {
            Some(Direction::Right)
        } else if self.drag_offset < -DIRECTION_THRESHOLD {
            Some(Direction::Left)
        } else {
            None
        }
    }

    fn reset_gesture(&mut self) {
        self.drag_active = false;
        self.drag_offset = 0.0;
        self.start_x = 0.0;
    }
}

/// Cosmetic placement of a mounted card relative to the active one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
}

/// Placement for a card `distance` positions behind the active one.
///
/// The active card follows the drag and tilts with it; cards behind it
/// shrink and sink a little per step.
pub fn card_transform(distance: usize, drag_offset: f64) -> CardTransform {
    if distance == 0 {
        return CardTransform {
            translate_x: drag_offset,
            translate_y: 0.0,
            scale: 1.0,
            rotation: drag_offset * 0.05,
        };
    }
    let d = distance as f64;
    CardTransform {
        translate_x: 0.0,
        translate_y: d * 10.0,
        scale: 0.95 - d * 0.05,
        rotation: 0.0,
    }
}

/// A mounted card: its index in the list, the card, and its distance behind the active card.
#[derive(Debug, PartialEq)]
pub struct Mounted<'a, C> {
    pub index: usize,
    pub card: &'a C,
    pub distance: usize,
}

/// Gesture-driven navigator over an ordered, caller-supplied list of cards.
///
/// Cards are never mutated. Every operation is total: empty and single-card
/// stacks simply turn every move into a no-op.
///
/// Operations that change the active card return `Some(new_index)`. That is
/// the "peek" notification for the host; a final selection is a separate host
/// action on [`Navigator::current`].
#[derive(Debug, Clone)]
pub struct Navigator<C> {
    cards: Vec<C>,
    state: NavigatorState,
}

impl<C> Navigator<C> {
    pub fn new(cards: Vec<C>) -> Self {
        Self {
            cards,
            state: NavigatorState::default(),
        }
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn cards(&self) -> &[C] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// The active card, or `None` for an empty stack.
    pub fn current(&self) -> Option<&C> {
        self.cards.get(self.state.current_index)
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.state.pending_direction()
    }

    /// Starts a drag at `pointer_x`. Ignored while a drag is already active.
    pub fn begin_gesture(&mut self, pointer_x: f64) {
        if self.state.drag_active || self.cards.is_empty() {
            return;
        }
        self.state.drag_active = true;
        self.state.start_x = pointer_x;
        self.state.drag_offset = 0.0;
    }

    /// Moves the active drag to `pointer_x`. Ignored when no drag is active.
    pub fn update_gesture(&mut self, pointer_x: f64) {
        if !self.state.drag_active {
            return;
        }
        self.state.drag_offset = pointer_x - self.state.start_x;
    }

    /// Releases the drag and applies the commit rule once.
    ///
    /// Returns the new active index if the release moved the stack.
    pub fn end_gesture(&mut self) -> Option<usize> {
        if !self.state.drag_active {
            return None;
        }
        let offset = self.state.drag_offset;
        let before = self.state.current_index;
        let last = self.cards.len().saturating_sub(1);

        if offset > COMMIT_THRESHOLD && before > 0 {
            self.state.current_index = before - 1;
        } else if offset < -COMMIT_THRESHOLD && before < last {
            self.state.current_index = before + 1;
        }
        self.state.reset_gesture();

        let after = self.state.current_index;
        debug!("Gesture ended: offset={offset:.1}, index {before} -> {after}");
        (after != before).then_some(after)
    }

    /// Jumps straight to `index`, cancelling any drag in progress.
    ///
    /// Out-of-range indices are ignored entirely.
    pub fn jump_to(&mut self, index: usize) -> Option<usize> {
        if index >= self.cards.len() {
            return None;
        }
        self.state.reset_gesture();
        let before = self.state.current_index;
        self.state.current_index = index;
        (index != before).then_some(index)
    }

    /// Single entry point for device-independent pointer input.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<usize> {
        match event {
            PointerEvent::Down(x) => {
                self.begin_gesture(x);
                None
            }
            PointerEvent::Move(x) => {
                self.update_gesture(x);
                None
            }
            PointerEvent::Up | PointerEvent::Cancel => self.end_gesture(),
        }
    }

    /// Index range of mounted cards: the active card plus up to [`LOOKAHEAD`] behind it.
    pub fn mounted_range(&self) -> std::ops::Range<usize> {
        if self.cards.is_empty() {
            return 0..0;
        }
        let start = self.state.current_index;
        let end = (start + LOOKAHEAD + 1).min(self.cards.len());
        start..end
    }

    /// Mounted cards, active first.
    pub fn mounted(&self) -> impl Iterator<Item = Mounted<'_, C>> {
        let start = self.state.current_index;
        self.mounted_range().map(move |index| Mounted {
            index,
            card: &self.cards[index],
            distance: index - start,
        })
    }
}
