// Runtime configuration. Values come from the environment (optionally a
// `.env` file) and the user id falls back to the session file written the
// last time someone logged in.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SESSION_FILE_NAME: &str = ".memorable_user";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MEMORABLE_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub user_id: Option<String>,
    pub timeout: Duration,
    pub session_file: PathBuf,
}

impl Config {
    /// Load `.env` if present, then read configuration from the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("no .env loaded: {e}");
        }
        Self::from_lookup(|key| std::env::var(key).ok(), default_session_file())
    }

    /// Build a config from any key lookup. `load` passes the environment;
    /// tests pass a closure.
    pub fn from_lookup<F>(lookup: F, session_file: PathBuf) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MEMORABLE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let timeout = match lookup("MEMORABLE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let user_id = match lookup("MEMORABLE_USER_ID").filter(|v| !v.trim().is_empty()) {
            Some(id) => Some(id.trim().to_string()),
            None => load_session(&session_file),
        };

        Ok(Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            timeout,
            session_file,
        })
    }

    /// Remember the user id for the next run.
    pub fn persist_user_id(&mut self, user_id: &str) -> Result<(), ConfigError> {
        std::fs::write(&self.session_file, user_id)?;
        self.user_id = Some(user_id.to_string());
        log::info!("saved user id to {}", self.session_file.display());
        Ok(())
    }
}

/// Session file in the user's home directory.
pub fn default_session_file() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(SESSION_FILE_NAME)
}

fn load_session(path: &Path) -> Option<String> {
    let data = std::fs::read_to_string(path).ok()?;
    let id = data.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
