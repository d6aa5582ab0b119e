//! # Questionnaire
//!
//! The answer set the user fills in before meeting any babies, plus the
//! autosave timer that batches edits into one save.
//!
//! Answers are kept as the raw JSON map the server returns so keys this
//! client doesn't know about survive a round trip.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::api::types::{AnswerMap, QuestionnaireData};

pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exactly one of the options (radio buttons).
    Single(&'static [&'static str]),
    /// Any subset of the options (checkboxes), stored as a JSON array.
    Multi(&'static [&'static str]),
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

pub const FIELDS: &[Field] = &[
    Field {
        key: "parenting_style",
        label: "What's your parenting style?",
        kind: FieldKind::Single(&["Gentle", "Structured", "Playful", "Educational"]),
    },
    Field {
        key: "energy_level",
        label: "What's your energy level?",
        kind: FieldKind::Single(&["High Energy", "Moderate", "Calm", "Very Calm"]),
    },
    Field {
        key: "traits",
        label: "Which traits would you love your baby to have?",
        kind: FieldKind::Multi(&[
            "Smart & Curious",
            "Funny & Outgoing",
            "Kind & Empathetic",
            "Creative & Artistic",
            "Athletic & Active",
        ]),
    },
    Field {
        key: "hobbies",
        label: "What are your hobbies?",
        kind: FieldKind::Text,
    },
    Field {
        key: "ideal_weekend",
        label: "Describe your ideal weekend",
        kind: FieldKind::Text,
    },
];

pub fn field(key: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.key == key)
}

/// A single change to the answer set.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerEdit {
    Choose { key: &'static str, option: &'static str },
    Toggle { key: &'static str, option: &'static str },
    Text { key: &'static str, value: String },
}

/// Trailing-edge debounce: fires once `delay` has passed since the last edit.
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    last_edit: Option<Instant>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_edit: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// Returns true exactly once per burst of edits, when the burst has gone quiet.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.last_edit {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_edit = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.last_edit = None;
    }
}

#[derive(Debug, Clone)]
pub struct Questionnaire {
    pub answers: AnswerMap,
    pub image_paths: Vec<String>,
    /// Set by the admin; edits are ignored while true.
    pub locked: bool,
    pub loaded: bool,
    pub saving: bool,
    pub last_saved: Option<DateTime<Local>>,
    pub autosave: Autosave,
}

impl Questionnaire {
    pub fn new(debounce: Duration) -> Self {
        Self {
            answers: AnswerMap::new(),
            image_paths: Vec::new(),
            locked: false,
            loaded: false,
            saving: false,
            last_saved: None,
            autosave: Autosave::new(debounce),
        }
    }

    /// Replaces local answers with what the server has.
    pub fn load(&mut self, data: QuestionnaireData, locked: bool) {
        self.answers = data.answers;
        self.image_paths = data.image_paths;
        self.locked = locked;
        self.loaded = true;
        self.autosave.cancel();
    }

    pub fn text(&self, key: &str) -> &str {
        self.answers.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn choice(&self, key: &str) -> Option<&str> {
        self.answers.get(key).and_then(Value::as_str)
    }

    pub fn is_checked(&self, key: &str, option: &str) -> bool {
        self.answers
            .get(key)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(option)))
    }

    /// Applies an edit and arms the autosave. Returns false when locked.
    pub fn apply(&mut self, edit: AnswerEdit, now: Instant) -> bool {
        if self.locked {
            return false;
        }
        match edit {
            AnswerEdit::Choose { key, option } => {
                self.answers.insert(key.to_string(), Value::from(option));
            }
            AnswerEdit::Toggle { key, option } => {
                let mut items: Vec<Value> = self
                    .answers
                    .get(key)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                if let Some(pos) = items.iter().position(|v| v.as_str() == Some(option)) {
                    items.remove(pos);
                } else {
                    items.push(Value::from(option));
                }
                self.answers.insert(key.to_string(), Value::Array(items));
            }
            AnswerEdit::Text { key, value } => {
                self.answers.insert(key.to_string(), Value::String(value));
            }
        }
        self.autosave.touch(now);
        true
    }

    /// Number of answered fields, for the progress line.
    pub fn answered(&self) -> usize {
        FIELDS
            .iter()
            .filter(|f| match self.answers.get(f.key) {
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Array(a)) => !a.is_empty(),
                _ => false,
            })
            .count()
    }
}
