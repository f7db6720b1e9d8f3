//! Auth session: fixed login credentials plus wherever the bearer token is
//! cached between requests.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, warn};

use crate::{config::Credentials, error::Result};

/// Persistent storage for the bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let token = self.token.lock().unwrap_or_else(|p| p.into_inner());
        Ok(token.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut slot = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *slot = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Keeps the token in a small JSON file so it survives restarts.
///
/// The file is read once, on the first load; later loads are answered from
/// memory. Stores and clears write through to the file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    /// `None` until the file has been read.
    cached: Mutex<Option<Option<String>>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Option<String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<StoredToken>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Ok(Some(stored.token)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("ignoring unreadable token file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let mut cached = self.cached.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.read_file()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec(&StoredToken {
            token: token.to_string(),
        })?;
        fs::write(&self.path, raw)?;
        *self.cached.lock().unwrap_or_else(|p| p.into_inner()) = Some(Some(token.to_string()));
        debug!("token persisted to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        *self.cached.lock().unwrap_or_else(|p| p.into_inner()) = Some(None);
        Ok(())
    }
}

/// Injectable replacement for a global token slot. Cloning shares the same
/// store and login gate.
#[derive(Clone)]
pub struct AuthSession {
    credentials: Credentials,
    store: Arc<dyn TokenStore>,
    login_gate: Arc<AsyncMutex<()>>,
}

impl AuthSession {
    pub fn new(credentials: Credentials, store: Arc<dyn TokenStore>) -> Self {
        Self {
            credentials,
            store,
            login_gate: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn in_memory(credentials: Credentials) -> Self {
        Self::new(credentials, Arc::new(MemoryTokenStore::new()))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.store.load()
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.store(token)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }

    /// Held while a login is in flight so concurrent re-logins collapse into one.
    pub(crate) async fn login_guard(&self) -> MutexGuard<'_, ()> {
        self.login_gate.lock().await
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
