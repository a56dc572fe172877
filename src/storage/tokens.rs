use crate::application::models::auth::TokenPair;
use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Persistent home of the token pair. Tokens are written on login, the
/// access entry is replaced on refresh, and everything is removed on logout
/// or irrecoverable refresh failure.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn save(&self, pair: &TokenPair);
    fn update_access(&self, access: &str);
    fn update_refresh(&self, refresh: &str);
    fn clear(&self);
}

#[derive(Default)]
struct TokenSlots {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-process store for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryTokenStore {
    slots: RwLock<TokenSlots>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TokenSlots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TokenSlots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    fn save(&self, pair: &TokenPair) {
        let mut slots = self.write();
        slots.access = Some(pair.access.clone());
        slots.refresh = Some(pair.refresh.clone());
    }

    fn update_access(&self, access: &str) {
        self.write().access = Some(access.to_string());
    }

    fn update_refresh(&self, refresh: &str) {
        self.write().refresh = Some(refresh.to_string());
    }

    fn clear(&self) {
        let mut slots = self.write();
        slots.access = None;
        slots.refresh = None;
    }
}

/// File-backed store keeping the pair as the two string keys
/// `access_token` / `refresh_token` in a small JSON document.
///
/// Persistence is best-effort: a failed write leaves the in-memory copy
/// authoritative for the rest of the process and logs a warning.
pub struct FileTokenStore {
    path: PathBuf,
    slots: RwLock<TokenSlots>,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let slots = Self::load(&path);
        Self {
            path,
            slots: RwLock::new(slots),
        }
    }

    fn load(path: &Path) -> TokenSlots {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No stored tokens at {}: {}", path.display(), e);
                return TokenSlots::default();
            }
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(doc) => TokenSlots {
                access: doc[ACCESS_TOKEN_KEY].as_str().map(String::from),
                refresh: doc[REFRESH_TOKEN_KEY].as_str().map(String::from),
            },
            Err(e) => {
                warn!("Ignoring corrupt token file {}: {}", path.display(), e);
                TokenSlots::default()
            }
        }
    }

    fn persist(&self, slots: &TokenSlots) {
        let mut doc = serde_json::Map::new();
        doc.insert(ACCESS_TOKEN_KEY.to_string(), json!(slots.access));
        doc.insert(REFRESH_TOKEN_KEY.to_string(), json!(slots.refresh));
        let doc = serde_json::Value::Object(doc);
        if let Err(e) = std::fs::write(&self.path, doc.to_string()) {
            warn!("Failed to persist tokens to {}: {}", self.path.display(), e);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TokenSlots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TokenSlots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.read().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh.clone()
    }

    fn save(&self, pair: &TokenPair) {
        let mut slots = self.write();
        slots.access = Some(pair.access.clone());
        slots.refresh = Some(pair.refresh.clone());
        self.persist(&slots);
    }

    fn update_access(&self, access: &str) {
        let mut slots = self.write();
        slots.access = Some(access.to_string());
        self.persist(&slots);
    }

    fn update_refresh(&self, refresh: &str) {
        let mut slots = self.write();
        slots.refresh = Some(refresh.to_string());
        self.persist(&slots);
    }

    fn clear(&self) {
        let mut slots = self.write();
        slots.access = None;
        slots.refresh = None;
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove token file {}: {}", self.path.display(), e);
            }
        }
    }
}
