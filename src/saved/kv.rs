//! Key-value backends for persisted client state

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use fjall::Keyspace;
use tracing::debug;

use crate::{RecycloseError, Result};

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store, used in tests and when no storage path is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RecycloseError::storage("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RecycloseError::storage("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk store backed by a fjall keyspace
pub struct FjallStore {
    db: fjall::Database,
    store: Keyspace,
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("saved", fjall::KeyspaceCreateOptions::default)?;
        debug!("Opened saved-items keyspace at {}", path.as_ref().display());
        Ok(FjallStore { db, store: items })
    }
}

impl KeyValueStore for FjallStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(bytes) = self.store.get(key.as_bytes())? else {
            return Ok(None);
        };
        // Undecodable bytes read as absent; callers treat that as empty state
        Ok(String::from_utf8(bytes.to_vec()).ok())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store.insert(key.as_bytes(), value.as_bytes())?;
        self.db.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.set("k", "w").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn test_fjall_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FjallStore::open(dir.path()).unwrap();
        assert_eq!(store.get("recyclose_saved_db_slugs").unwrap(), None);
        store.set("recyclose_saved_db_slugs", "[\"battery\"]").unwrap();
        assert_eq!(
            store.get("recyclose_saved_db_slugs").unwrap().as_deref(),
            Some("[\"battery\"]")
        );
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
