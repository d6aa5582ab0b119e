//! # Auth Session
//!
//! The logged-in user, persisted to `~/.aibaby/session.json`.
//!
//! The session is an explicit value: it is loaded once at start, handed by
//! reference to the request layer, and saved whenever it changes. Nothing
//! reads it from ambient global storage.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::api::types::{AuthResponse, Role};

/// The authenticated user as remembered between runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub email: String,
    pub role: Role,
    pub token: String,
    #[serde(default)]
    pub selected_baby_id: Option<i64>,
}

impl From<AuthResponse> for User {
    fn from(auth: AuthResponse) -> Self {
        Self {
            email: auth.email,
            role: auth.role,
            token: auth.token,
            selected_baby_id: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    pub fn logged_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.token.as_str())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.user, Some(User { role: Role::Admin, .. }))
    }
}

/// Returns `~/.aibaby/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".aibaby").join("session.json"))
}

/// Loads and saves a [`Session`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session.
    ///
    /// A missing file means nobody is logged in. A corrupt file is logged and
    /// treated the same way so a bad write never locks the user out.
    pub fn load(&self) -> Session {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Session::default();
            }
            Err(e) => {
                warn!("Failed to read session {}: {}", self.path.display(), e);
                return Session::default();
            }
        };
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => {
                info!(
                    "Loaded session for {}",
                    session.user.as_ref().map_or("<nobody>", |u| u.email.as_str())
                );
                session
            }
            Err(e) => {
                warn!("Ignoring malformed session {}: {}", self.path.display(), e);
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write_json(&self.path, session)?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Forgets the user and persists the empty session.
    pub fn clear(&self, session: &mut Session) -> io::Result<()> {
        session.user = None;
        self.save(session)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            email: "alice@example.com".to_string(),
            role: Role::User,
            token: "tok-123".to_string(),
            selected_baby_id: Some(4),
        }
    }

    #[test]
    fn test_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load(), Session::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        let session = Session::logged_in(alice());
        store.save(&session).unwrap();

        assert_eq!(store.load(), session);
        assert!(!dir.path().join("nested").join("session.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SessionStore::new(path).load(), Session::default());
    }

    #[test]
    fn test_clear_persists_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut session = Session::logged_in(alice());
        store.save(&session).unwrap();

        store.clear(&mut session).unwrap();
        assert!(session.user.is_none());
        assert!(store.load().user.is_none());
    }

    #[test]
    fn test_user_from_auth_response() {
        let user = User::from(AuthResponse {
            token: "t".into(),
            role: Role::Admin,
            email: "root@example.com".into(),
        });
        assert_eq!(user.role, Role::Admin);
        assert!(Session::logged_in(user).is_admin());
    }
}
