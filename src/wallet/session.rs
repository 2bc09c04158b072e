//! Persisted "previously connected" flag
//!
//! The only state that outlives a session. Stored like browser local storage:
//! string values under a fixed key, `"true"` when set, absent otherwise.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Result, WalletError};

/// Storage key of the flag
pub const SESSION_KEY: &str = "endless_wallet_connected";

/// Where the flag lives
pub trait SessionStore: Send + Sync {
    fn was_connected(&self) -> bool;

    fn set_connected(&self, connected: bool) -> Result<()>;
}

/// Flag held in memory only
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    connected: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the flag already set
    pub fn previously_connected() -> Self {
        Self {
            connected: AtomicBool::new(true),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn was_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn set_connected(&self, connected: bool) -> Result<()> {
        self.connected.store(connected, Ordering::SeqCst);
        Ok(())
    }
}

/// Flag kept in a JSON key/value file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| WalletError::Session(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| WalletError::Session(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| WalletError::Session(format!("{}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| WalletError::Session(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| WalletError::Session(format!("{}: {}", self.path.display(), e)))
    }
}

impl SessionStore for FileSessionStore {
    fn was_connected(&self) -> bool {
        match self.load() {
            Ok(entries) => entries.get(SESSION_KEY).map(String::as_str) == Some("true"),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session store: {}", e);
                false
            }
        }
    }

    fn set_connected(&self, connected: bool) -> Result<()> {
        // A corrupt file is overwritten rather than blocking the flag
        let mut entries = self.load().unwrap_or_default();
        if connected {
            entries.insert(SESSION_KEY.to_string(), "true".to_string());
        } else {
            entries.remove(SESSION_KEY);
        }
        self.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileSessionStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileSessionStore::new(dir.path().join("nexus").join("session.json"));
        (dir, store)
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(!store.was_connected());
        store.set_connected(true).unwrap();
        assert!(store.was_connected());
        store.set_connected(false).unwrap();
        assert!(!store.was_connected());

        assert!(MemorySessionStore::previously_connected().was_connected());
    }

    #[test]
    fn test_file_store_round_trip() {
        let (_dir, store) = temp_store();
        assert!(!store.was_connected());

        store.set_connected(true).unwrap();
        assert!(store.was_connected());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"endless_wallet_connected\": \"true\""));

        store.set_connected(false).unwrap();
        assert!(!store.was_connected());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let (_dir, store) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"theme":"light"}"#).unwrap();

        store.set_connected(true).unwrap();
        store.set_connected(false).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("theme"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let (_dir, store) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(!store.was_connected());
        store.set_connected(true).unwrap();
        assert!(store.was_connected());
    }

    #[test]
    fn test_file_store_cleaned_up_with_dir() {
        let (dir, store) = temp_store();
        store.set_connected(true).unwrap();
        let root = dir.path().to_path_buf();
        assert!(store.path().starts_with(&root));

        dir.close().unwrap();
        assert!(!root.exists());
    }
}
