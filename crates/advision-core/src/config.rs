//! Application configuration management.
//!
//! Holds the persisted settings (API base URL, login path, optional request
//! timeout, last used email) and resolves the effective base URL.
//!
//! Configuration is stored at `~/.config/advision/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "advision";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "ADVISION_API_URL";

/// Base URL used when neither the environment nor the config file set one
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Login entry point announced when the server rejects the session
pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    /// Base URL given for this run only (e.g. a command line flag); never saved
    #[serde(skip)]
    pub api_url_override: Option<String>,
    pub login_path: Option<String>,
    /// No client-side timeout unless set
    pub request_timeout_secs: Option<u64>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the session file
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Effective API base URL: run override, environment, config file, then default.
    pub fn api_url(&self) -> String {
        let env = self
            .api_url_override
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok());
        resolve_api_url(env, self.api_url.as_deref())
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Pick the base URL from an environment value and a configured value.
/// Blank values are ignored and trailing slashes dropped.
pub fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
    let pick = |value: &str| {
        let trimmed = value.trim().trim_end_matches('/');
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    env.as_deref()
        .and_then(pick)
        .or_else(|| configured.and_then(pick))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}
