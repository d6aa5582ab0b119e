//! # API Layer
//!
//! Typed access to the AI Baby REST API: wire types, the HTTP client, and
//! the dispatcher that runs reducer requests.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use error::{ApiError, ErrorKind};
pub use types::{Baby, ChatMessage, ChatRole, LifeStage, Role};
