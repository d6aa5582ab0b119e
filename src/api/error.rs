use std::fmt;

/// Errors from the request layer.
///
/// The page layer reacts by [`ErrorKind`]: transport and server failures keep
/// the previous state and show a message, validation failures are shown
/// inline before anything is sent, authorization failures redirect.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Rejected client-side; nothing was sent.
    Validation(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Server returned a non-success status.
    Api {
        status: u16,
        message: String,
        limit_reached: bool,
    },
    /// Response body did not match the expected shape.
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Validation,
    Authorization,
    Server,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Network(_) => ErrorKind::Transport,
            ApiError::Api { status: 401 | 403, .. } => ErrorKind::Authorization,
            ApiError::Api { status: 400, .. } => ErrorKind::Validation,
            ApiError::Api { .. } | ApiError::Parse(_) => ErrorKind::Server,
        }
    }

    /// True when the bearer token was rejected and the session is stale.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Api { status: 401, .. })
    }

    /// True when the server refused a chat message because the cap was hit.
    pub fn limit_reached(&self) -> bool {
        matches!(self, ApiError::Api { limit_reached: true, .. })
    }

    /// Short text suitable for the status bar.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Network(_) => "Could not reach the server".to_string(),
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Api { status, .. } => format!("Request failed (HTTP {status})"),
            ApiError::Parse(_) => "Unexpected response from server".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "validation error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api {
                status, message, ..
            } => write!(f, "API error (HTTP {status}): {message}"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
