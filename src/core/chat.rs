//! # Conversation
//!
//! A turn-limited chat with one baby, optionally at a chosen life stage.
//! The server counts both sides of the conversation and refuses new
//! messages once [`MESSAGE_LIMIT`] is reached.

use crate::api::types::{Baby, ChatHistory, ChatMessage, ChatRole, LifeStage, SendMessageResponse};
use crate::api::ApiError;

/// Messages (user + assistant) allowed per conversation.
pub const MESSAGE_LIMIT: u32 = 20;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub baby: Baby,
    pub stage: Option<LifeStage>,
    pub messages: Vec<ChatMessage>,
    pub message_count: u32,
    pub limit_reached: bool,
    /// Text sent and awaiting a reply.
    pub pending: Option<String>,
    /// Text whose send failed, waiting to be put back in the input.
    pub unsent: Option<String>,
    pub loaded: bool,
}

impl Conversation {
    pub fn new(baby: Baby, stage: Option<LifeStage>) -> Self {
        Self {
            baby,
            stage,
            messages: Vec::new(),
            message_count: 0,
            limit_reached: false,
            pending: None,
            unsent: None,
            loaded: false,
        }
    }

    pub fn baby_id(&self) -> i64 {
        self.baby.id
    }

    pub fn apply_history(&mut self, history: ChatHistory) {
        self.messages = history.messages;
        self.message_count = history.message_count;
        self.limit_reached = history.message_count >= MESSAGE_LIMIT;
        self.loaded = true;
    }

    pub fn can_send(&self) -> bool {
        !self.limit_reached && self.pending.is_none()
    }

    /// Marks `text` as in flight. Returns the trimmed message to send, or
    /// `None` if it is blank or sending is not allowed right now.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let message = text.trim();
        if message.is_empty() || !self.can_send() {
            return None;
        }
        self.pending = Some(message.to_string());
        Some(message.to_string())
    }

    /// Records a successful exchange: the sent message and the reply.
    pub fn apply_reply(&mut self, sent: String, reply: SendMessageResponse) {
        self.pending = None;
        self.messages.push(ChatMessage {
            message: sent,
            role: ChatRole::User,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        });
        self.messages.push(ChatMessage {
            message: reply.message,
            role: ChatRole::Assistant,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        });
        self.message_count = reply.message_count;
        self.limit_reached = reply.limit_reached || reply.message_count >= MESSAGE_LIMIT;
    }

    /// Clears the in-flight message after a failure and parks it in
    /// `unsent` so it can be restored to the input.
    pub fn fail_send(&mut self, error: &ApiError) {
        if error.limit_reached() {
            self.limit_reached = true;
        }
        self.unsent = self.pending.take();
    }

    pub fn remaining(&self) -> u32 {
        MESSAGE_LIMIT.saturating_sub(self.message_count)
    }

    /// Header title, e.g. "Chat with Lily at 5 years".
    pub fn title(&self) -> String {
        match &self.stage {
            Some(stage) => format!("Chat with {} at {}", self.baby.name, stage.age),
            None => format!("Chat with {}", self.baby.name),
        }
    }
}
