use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const API_URL_VAR: &str = "QSTUDIO_API_URL";
pub const HOME_VAR: &str = "QSTUDIO_HOME";
pub const TOKEN_VAR: &str = "QSTUDIO_TOKEN";
pub const LOG_VAR: &str = "QSTUDIO_LOG";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Runtime settings resolved from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend origin, without the `/api` prefix and without a trailing slash
    pub api_url: String,
    /// Directory holding `credentials.json`
    pub state_dir: PathBuf,
    /// Access token that takes precedence over the stored credentials
    pub token_override: Option<String>,
}

impl Config {
    /// Read `QSTUDIO_API_URL`, `QSTUDIO_HOME` and `QSTUDIO_TOKEN`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Internal helper taking the variable lookup as a parameter (for testing)
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_blank(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let state_dir = match non_blank(HOME_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_state_dir()?,
        };

        Ok(Self {
            api_url: normalize_api_url(&api_url),
            state_dir,
            token_override: non_blank(TOKEN_VAR).map(|t| t.trim().to_string()),
        })
    }

    /// Replace the backend origin (the `--api-url` flag)
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_api_url(api_url);
        self
    }
}

/// Get the platform state directory (`<config dir>/question-studio`)
pub fn default_state_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to get platform config directory")?;
    Ok(base.join("question-studio"))
}

fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
