//! Client-side checks that run before any request is sent.

use std::fmt;
use std::path::Path;

/// Largest image the server accepts.
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    PasswordMismatch,
    PasswordTooShort,
    FileMissing(String),
    FileTooLarge { size: u64, max: u64 },
    UnsupportedFileType(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(name) => write!(f, "{name} is required"),
            ValidationError::PasswordMismatch => write!(f, "New passwords do not match"),
            ValidationError::PasswordTooShort => {
                write!(f, "Password must be at least {MIN_PASSWORD_LEN} characters")
            }
            ValidationError::FileMissing(path) => write!(f, "File not found: {path}"),
            ValidationError::FileTooLarge { max, .. } => {
                write!(f, "File too large (max {}MB)", max / (1024 * 1024))
            }
            ValidationError::UnsupportedFileType(ext) => {
                write!(f, "Unsupported file type: {ext}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyField("Email"));
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyField("Password"));
    }
    Ok(())
}

/// Checks a password change: the confirmation must match and the new password must be long enough.
pub fn validate_new_password(new: &str, confirm: &str) -> Result<(), ValidationError> {
    if new != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Checks an image before upload. Returns its size in bytes.
pub fn validate_upload(path: &Path, max_bytes: u64) -> Result<u64, ValidationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ValidationError::UnsupportedFileType(if ext.is_empty() {
            "(none)".to_string()
        } else {
            ext
        }));
    }

    let meta = std::fs::metadata(path)
        .map_err(|_| ValidationError::FileMissing(path.display().to_string()))?;
    if !meta.is_file() {
        return Err(ValidationError::FileMissing(path.display().to_string()));
    }
    let size = meta.len();
    if size > max_bytes {
        return Err(ValidationError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }
    Ok(size)
}

/// MIME type for an already-validated image path.
pub fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
