//! HTTP client for the AI Baby REST API.
//!
//! One method per endpoint. Every call takes the current [`Session`] by
//! reference and attaches its bearer token when someone is logged in; the
//! client itself holds no auth state.

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::multipart;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    AnswerMap, AssignRequest, AuthResponse, Baby, ChangePasswordRequest, ChatHistory,
    Credentials, ErrorBody, LifeStage, LockRequest, Me, PartnerRequest, QuestionnaireData,
    QuestionnaireSummary, SaveQuestionnaireRequest, SelectBabyRequest, SelectedBabyResponse,
    SendMessageRequest, SendMessageResponse, Settings, UploadResponse, UserSummary,
    VisibilityRequest,
};
use crate::core::session::Session;
use crate::core::validation::{image_mime, validate_upload};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("client setup failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an image path as the server reports it.
    ///
    /// Full URLs pass through; server paths are resolved against the host,
    /// which serves static files outside `/api`.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let origin = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        format!("{}/{}", origin, path.trim_start_matches('/'))
    }

    /// URL of a questionnaire upload, by stored filename.
    pub fn upload_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.base_url, filename)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
        session: &Session,
    ) -> reqwest::RequestBuilder {
        match session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and decodes a success body, or turns a failure status into [`ApiError::Api`].
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!("{what}: network failure: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("{what}: HTTP {status}");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed.error.or(parsed.message).unwrap_or(body);
            warn!("{what}: API error {} - {}", status.as_u16(), message);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
                limit_reached: parsed.limit_reached,
            });
        }

        response.json::<T>().await.map_err(|e| {
            warn!("{what}: undecodable response: {e}");
            ApiError::Parse(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T, ApiError> {
        info!("GET {path}");
        let builder = self.authorize(self.client.get(self.url(path)), session);
        self.send(builder, path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: &Session,
    ) -> Result<T, ApiError> {
        info!("POST {path}");
        let builder = self.authorize(self.client.post(self.url(path)).json(body), session);
        self.send(builder, path).await
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body, &Session::default()).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/register", &body, &Session::default()).await
    }

    pub async fn me(&self, session: &Session) -> Result<Me, ApiError> {
        self.get("/auth/me", session).await
    }

    pub async fn change_password(
        &self,
        session: &Session,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.post::<_, serde_json::Value>("/auth/change-password", &body, session)
            .await
            .map(|_| ())
    }

    pub async fn update_partner(&self, session: &Session, partner: &str) -> Result<(), ApiError> {
        let body = PartnerRequest {
            partner: partner.to_string(),
        };
        self.post::<_, serde_json::Value>("/auth/partner", &body, session)
            .await
            .map(|_| ())
    }

    pub async fn users(&self, session: &Session) -> Result<Vec<UserSummary>, ApiError> {
        self.get("/auth/users", session).await
    }

    // ------------------------------------------------------------------------
    // Questionnaire
    // ------------------------------------------------------------------------

    pub async fn questionnaire(&self, session: &Session) -> Result<QuestionnaireData, ApiError> {
        self.get("/questionnaire", session).await
    }

    pub async fn save_questionnaire(
        &self,
        session: &Session,
        answers: &AnswerMap,
    ) -> Result<(), ApiError> {
        let body = SaveQuestionnaireRequest { answers };
        self.post::<_, serde_json::Value>("/questionnaire", &body, session)
            .await
            .map(|_| ())
    }

    /// Uploads an image for the questionnaire.
    ///
    /// Type and size are checked before anything is sent; a rejected file
    /// comes back as [`ApiError::Validation`].
    pub async fn upload_image(
        &self,
        session: &Session,
        path: &Path,
        max_bytes: u64,
    ) -> Result<UploadResponse, ApiError> {
        let size = validate_upload(path, max_bytes).map_err(|e| {
            info!("Upload rejected before sending: {e}");
            ApiError::Validation(e.to_string())
        })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Validation(format!("Could not read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path))
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        info!("POST /questionnaire/upload ({size} bytes)");
        let builder = self.authorize(
            self.client
                .post(self.url("/questionnaire/upload"))
                .multipart(form),
            session,
        );
        self.send(builder, "/questionnaire/upload").await
    }

    pub async fn all_questionnaires(
        &self,
        session: &Session,
    ) -> Result<Vec<QuestionnaireSummary>, ApiError> {
        self.get("/questionnaires/all", session).await
    }

    // ------------------------------------------------------------------------
    // Babies
    // ------------------------------------------------------------------------

    pub async fn babies(&self, session: &Session) -> Result<Vec<Baby>, ApiError> {
        self.get("/babies", session).await
    }

    pub async fn my_babies(&self, session: &Session) -> Result<Vec<Baby>, ApiError> {
        self.get("/babies/my-babies", session).await
    }

    pub async fn selected_baby(&self, session: &Session) -> Result<Option<Baby>, ApiError> {
        self.get::<SelectedBabyResponse>("/babies/selected", session)
            .await
            .map(|r| r.selected_baby)
    }

    pub async fn select_baby(&self, session: &Session, baby_id: i64) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>(
            "/babies/selected",
            &SelectBabyRequest { baby_id },
            session,
        )
        .await
        .map(|_| ())
    }

    pub async fn set_babies_visible(
        &self,
        session: &Session,
        is_visible: bool,
    ) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>(
            "/babies/visibility",
            &VisibilityRequest { is_visible },
            session,
        )
        .await
        .map(|_| ())
    }

    pub async fn assign_baby(
        &self,
        session: &Session,
        baby_id: i64,
        user_id: i64,
    ) -> Result<(), ApiError> {
        let path = format!("/babies/{baby_id}/assign");
        self.post::<_, serde_json::Value>(&path, &AssignRequest { baby_id, user_id }, session)
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    pub async fn chat_history(
        &self,
        session: &Session,
        baby_id: i64,
    ) -> Result<ChatHistory, ApiError> {
        self.get(&format!("/chat/{baby_id}"), session).await
    }

    pub async fn send_message(
        &self,
        session: &Session,
        baby_id: i64,
        message: &str,
        stage: Option<&LifeStage>,
    ) -> Result<SendMessageResponse, ApiError> {
        let body = SendMessageRequest { message, stage };
        self.post(&format!("/chat/{baby_id}"), &body, session).await
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub async fn settings(&self, session: &Session) -> Result<Settings, ApiError> {
        self.get("/settings", session).await
    }

    pub async fn set_questionnaires_locked(
        &self,
        session: &Session,
        is_locked: bool,
    ) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>(
            "/settings/questionnaires-lock",
            &LockRequest { is_locked },
            session,
        )
        .await
        .map(|_| ())
    }
}
