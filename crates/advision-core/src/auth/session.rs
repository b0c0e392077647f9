use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime in days, fixed when the token is written.
const TOKEN_LIFETIME_DAYS: i64 = 7;

/// Persisted form of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            token: token.into(),
            created_at,
            expires_at: created_at + Duration::days(TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Whole days remaining until expiry (for display)
    pub fn days_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_days().max(0)
    }
}

/// Storage for the bearer token attached to outgoing requests.
///
/// `token` never fails: a store that cannot be read reports no token.
/// Expired tokens are reported as absent, the way a browser drops an
/// expired cookie.
pub trait SessionStore: Send + Sync {
    /// Persist `token` with a fresh 7-day expiry, replacing any existing token.
    fn set_token(&self, token: &str) -> Result<()>;

    fn token(&self) -> Option<String>;

    /// Delete the persisted token. Succeeds when there is none.
    fn remove_token(&self) -> Result<()>;

    /// Presence check only; the token itself is never inspected.
    fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }
}

/// Session store backed by a JSON file in the cache directory.
#[derive(Debug)]
pub struct FileSessionStore {
    cache_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    /// Load the stored session, including its expiry metadata.
    /// Returns `Ok(None)` when no unexpired session exists.
    pub fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;

        if data.is_expired() {
            debug!(path = %path.display(), "Stored session expired");
            return Ok(None);
        }
        Ok(Some(data))
    }

    fn write(&self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(data)?;

        // The token is written to a private temp file, then renamed over the old one
        let tmp = path.with_extension("json.tmp");
        let mut file = open_private(&tmp).context("Failed to create session file")?;
        file.write_all(contents.as_bytes()).context("Failed to write session file")?;
        drop(file);
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn set_token(&self, token: &str) -> Result<()> {
        self.write(&SessionData::new(token))
    }

    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(data) => data.map(|d| d.token),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn remove_token(&self) -> Result<()> {
        match std::fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}

/// Open `path` for writing, readable by the owner only.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; a leftover temp file keeps its own
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

/// In-process session store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: RwLock<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            data: RwLock::new(Some(SessionData::new(token))),
        }
    }

    pub fn data(&self) -> Option<SessionData> {
        self.read().clone()
    }

    /// Replace the stored record as-is, e.g. with one that has already expired.
    pub fn replace(&self, data: Option<SessionData>) {
        *self.write() = data;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionData>> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionData>> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn set_token(&self, token: &str) -> Result<()> {
        *self.write() = Some(SessionData::new(token));
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.read()
            .as_ref()
            .filter(|d| !d.is_expired())
            .map(|d| d.token.clone())
    }

    fn remove_token(&self) -> Result<()> {
        *self.write() = None;
        Ok(())
    }
}
