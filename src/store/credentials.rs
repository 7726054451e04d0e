use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::settings::Settings;
use crate::models::user::User;

/// What survives between invocations: the bearer token and the identity it
/// was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub access_token: String,
    pub user: User,
}

/// Storage port for the persisted session. The session store and API client
/// only talk to this trait, so tests can swap in an in-memory substitute.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed store at `~/.ticketflow/session.json`, written with the same
/// 0600 permissions as the config file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Settings::config_dir()?.join("session.json"))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A corrupt session file reads as logged out, not as an error.
                debug!("ignoring unreadable session file: {}", err);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let raw =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(&self.path, raw).context("Failed to write session file")?;

        // Restrict permissions on Unix systems (contains a bearer token)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("Failed to remove session file"),
        }
    }
}

/// In-memory substitute used by tests. Counts `clear` calls so tests can
/// assert how often a 401 wiped the session.
#[cfg(test)]
pub struct MemoryCredentialStore {
    inner: std::sync::Mutex<Option<PersistedSession>>,
    clear_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Mutex::new(None),
            clear_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn with_session(session: PersistedSession) -> Self {
        let store = Self::new();
        *store.inner.lock().unwrap() = Some(session);
        store
    }

    pub fn stored(&self) -> Option<PersistedSession> {
        self.inner.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self.inner.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner.lock().unwrap().take();
        self.clear_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
