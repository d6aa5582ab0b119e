//! Wire types for the AI Baby REST API.
//!
//! Field names follow the server's JSON exactly. Optional or late-added
//! fields carry `#[serde(default)]` so older servers still parse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Auth
// ============================================================================

#[derive(Serialize, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Returned by both `/auth/login` and `/auth/register`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub email: String,
}

/// `/auth/me`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Me {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub selected_baby_id: Option<i64>,
    #[serde(default)]
    pub partner: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct PartnerRequest {
    pub partner: String,
}

/// Entry of `/auth/users` (admin only).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

// ============================================================================
// Questionnaire
// ============================================================================

/// Free-form answers keyed by field name.
pub type AnswerMap = serde_json::Map<String, serde_json::Value>;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QuestionnaireData {
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct SaveQuestionnaireRequest<'a> {
    pub answers: &'a AnswerMap,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub filename: String,
}

/// Entry of `/questionnaires/all` (admin only).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionnaireSummary {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ============================================================================
// Babies
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LifeStage {
    pub age: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Baby {
    pub id: i64,
    pub name: String,
    pub age: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub life_stages: Vec<LifeStage>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

fn default_visible() -> bool {
    true
}

/// The server sends `null` for babies created before life stages existed.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<LifeStage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<LifeStage>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SelectedBabyResponse {
    pub selected_baby: Option<Baby>,
}

#[derive(Serialize, Debug, Clone)]
pub struct SelectBabyRequest {
    pub baby_id: i64,
}

#[derive(Serialize, Debug, Clone)]
pub struct VisibilityRequest {
    pub is_visible: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct AssignRequest {
    pub baby_id: i64,
    pub user_id: i64,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub message: String,
    pub role: ChatRole,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub message_count: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'a LifeStage>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SendMessageResponse {
    pub message: String,
    pub message_count: u32,
    #[serde(default)]
    pub limit_reached: bool,
}

// ============================================================================
// Settings
// ============================================================================

/// `/settings` is a flat key → value object.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Settings(pub HashMap<String, serde_json::Value>);

impl Settings {
    pub fn questionnaires_locked(&self) -> bool {
        match self.0.get("questionnaires_locked") {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LockRequest {
    pub is_locked: bool,
}

/// Error body shape shared by all endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub limit_reached: bool,
}
