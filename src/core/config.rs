//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.aibaby/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::gesture::DEFAULT_UNITS_PER_COLUMN;
use crate::core::questionnaire::DEFAULT_AUTOSAVE_DEBOUNCE;
use crate::core::session::default_session_path;
use crate::core::validation::MAX_UPLOAD_BYTES;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AibabyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub autosave_debounce_ms: Option<u64>,
    /// Gesture units one terminal column is worth.
    pub units_per_column: Option<f64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "AIBABY_API_URL";
pub const ENV_SESSION_FILE: &str = "AIBABY_SESSION_FILE";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub max_upload_bytes: u64,
    pub session_file: PathBuf,
    pub autosave_debounce: Duration,
    pub units_per_column: f64,
}

/// Values given on the command line; `None` means not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.aibaby/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".aibaby").join("config.toml"))
}

/// Load config from `~/.aibaby/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AibabyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<AibabyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(AibabyConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<AibabyConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(AibabyConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AibabyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# AI Baby Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "http://localhost:5000/api"   # Or set AIBABY_API_URL
# timeout_secs = 30
# max_upload_bytes = 1048576                # Uploads larger than this are refused locally

# [session]
# file = "/home/me/.aibaby/session.json"    # Or set AIBABY_SESSION_FILE

# [ui]
# autosave_debounce_ms = 1000               # Quiet time before questionnaire edits are saved
# units_per_column = 10.0                   # Swipe distance one terminal column is worth
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AibabyConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &AibabyConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API URL: CLI → env → config → default
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| env(ENV_API_URL))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    // Session file: CLI → env → config → default
    let session_file = cli
        .session_file
        .clone()
        .or_else(|| env(ENV_SESSION_FILE).map(PathBuf::from))
        .or_else(|| config.session.file.clone())
        .or_else(default_session_path)
        .unwrap_or_else(|| PathBuf::from("session.json"));

    let units_per_column = match config.ui.units_per_column {
        Some(u) if u.is_finite() && u > 0.0 => u,
        Some(u) => {
            warn!("Ignoring invalid units_per_column {u}, using {DEFAULT_UNITS_PER_COLUMN}");
            DEFAULT_UNITS_PER_COLUMN
        }
        None => DEFAULT_UNITS_PER_COLUMN,
    };

    ResolvedConfig {
        api_url,
        timeout: Duration::from_secs(config.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        max_upload_bytes: config.api.max_upload_bytes.unwrap_or(MAX_UPLOAD_BYTES),
        session_file,
        autosave_debounce: config
            .ui
            .autosave_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_AUTOSAVE_DEBOUNCE),
        units_per_column,
    }
}
