//! # Gesture Input
//!
//! Mouse and touch report the same drag in different shapes. Both are folded
//! into a single [`PointerEvent`] so the navigator has one entry point per
//! gesture phase no matter which device produced it.
//!
//! ```text
//! MouseInput ─┐
//!             ├─▶ normalize() ─▶ PointerEvent ─▶ Navigator::handle_pointer
//! TouchInput ─┘
//! ```

/// Device-independent pointer event, in navigator units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(f64),
    Move(f64),
    Up,
    /// Pointer left the surface or the gesture was interrupted. Ends like `Up`.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInput {
    pub kind: MouseKind,
    pub x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
}

/// A touch event carrying the touch points currently on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput<'a> {
    pub kind: TouchKind,
    pub touches: &'a [TouchPoint],
}

/// Raw input from either device family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput<'a> {
    Mouse(MouseInput),
    Touch(TouchInput<'a>),
}

/// Folds raw device input into a [`PointerEvent`].
///
/// Touch tracks the first touch point only. A touch start or move that
/// arrives without any touch points carries no coordinate and yields `None`.
pub fn normalize(input: RawInput<'_>) -> Option<PointerEvent> {
    match input {
        RawInput::Mouse(MouseInput { kind, x }) => Some(match kind {
            MouseKind::Down => PointerEvent::Down(x),
            MouseKind::Move => PointerEvent::Move(x),
            MouseKind::Up => PointerEvent::Up,
            MouseKind::Leave => PointerEvent::Cancel,
        }),
        RawInput::Touch(TouchInput { kind, touches }) => match kind {
            TouchKind::Start => touches.first().map(|t| PointerEvent::Down(t.x)),
            TouchKind::Move => touches.first().map(|t| PointerEvent::Move(t.x)),
            TouchKind::End => Some(PointerEvent::Up),
            TouchKind::Cancel => Some(PointerEvent::Cancel),
        },
    }
}

/// Converts terminal columns into navigator units.
///
/// A terminal cell is far coarser than a pixel, so each column counts for
/// several units. With the default scale a ten-column drag commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerScale {
    pub units_per_column: f64,
}

impl Default for PointerScale {
    fn default() -> Self {
        Self {
            units_per_column: DEFAULT_UNITS_PER_COLUMN,
        }
    }
}

pub const DEFAULT_UNITS_PER_COLUMN: f64 = 10.0;

impl PointerScale {
    pub fn new(units_per_column: f64) -> Self {
        if units_per_column.is_finite() && units_per_column > 0.0 {
            Self { units_per_column }
        } else {
            Self::default()
        }
    }

    pub fn to_units(&self, column: u16) -> f64 {
        f64::from(column) * self.units_per_column
    }

    /// Units back to whole columns, rounded toward zero.
    pub fn to_columns(&self, units: f64) -> i32 {
        (units / self.units_per_column) as i32
    }
}
