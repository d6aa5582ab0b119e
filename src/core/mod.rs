//! # Core Application Logic
//!
//! This module contains AI Baby's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Navigator (cards)    │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No network. No UI.     │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │    API     │
//!            │  Adapter   │            │  (reqwest) │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`navigator`]: Card-stack state machine driven by pointer gestures
//! - [`gesture`]: Mouse/touch normalization into one pointer stream
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`routing`]: Screens and role guards
//! - [`questionnaire`]: Answers, the admin lock and debounced autosave
//! - [`chat`]: One turn-limited conversation
//! - [`validation`]: Form checks done before any request
//! - [`session`]: The persisted login
//! - [`config`]: Layered configuration

pub mod action;
pub mod chat;
pub mod config;
pub mod gesture;
pub mod navigator;
pub mod questionnaire;
pub mod routing;
pub mod session;
pub mod state;
pub mod validation;
