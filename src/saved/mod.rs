//! Saved knowledge-base items (bookmarks).
//!
//! Slugs are kept as a JSON array under a single key. Every mutation is a
//! read-modify-write of the whole list, serialised by `write_lock`. Subscribers
//! are notified synchronously once the lock is released, so a callback may
//! itself toggle or clear.

pub mod kv;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub use kv::{FjallStore, KeyValueStore, MemoryStore};

use crate::{RecycloseError, Result};

/// Storage key of the saved-slug list
pub const SAVED_KEY: &str = "recyclose_saved_db_slugs";

static GLOBAL_SAVED: OnceCell<SavedStore> = OnceCell::const_new();

type Listener = Arc<dyn Fn(&[String]) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<BTreeMap<u64, Listener>>,
}

/// Bookmark list over a [`KeyValueStore`]
pub struct SavedStore {
    backend: Box<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    listeners: Arc<Listeners>,
}

/// Handle returned by [`SavedStore::subscribe`]; dropping it unsubscribes
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut entries) = listeners.entries.lock() {
                entries.remove(&self.id);
            }
        }
    }
}

impl SavedStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
            listeners: Arc::new(Listeners::default()),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Current slugs in save order, for display.
    ///
    /// Missing, unreadable or malformed content reads as an empty list, and
    /// non-string entries are dropped.
    #[must_use]
    pub fn slugs(&self) -> Vec<String> {
        self.read_slugs().unwrap_or_else(|e| {
            warn!("Could not read saved items, treating as empty: {}", e);
            Vec::new()
        })
    }

    /// Stored slugs. Backend failures are returned; only content that does
    /// not decode as a JSON array reads as empty.
    fn read_slugs(&self) -> Result<Vec<String>> {
        let Some(raw) = self.backend.get(SAVED_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(values)) => Ok(values
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            Ok(_) | Err(_) => {
                warn!("Saved items are malformed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    #[must_use]
    pub fn is_saved(&self, slug: &str) -> bool {
        self.slugs().iter().any(|s| s == slug)
    }

    /// Save `slug` if absent, remove it if present. Returns whether it is
    /// saved afterwards.
    pub fn toggle(&self, slug: &str) -> Result<bool> {
        if slug.trim().is_empty() {
            return Err(RecycloseError::validation("slug must not be empty"));
        }

        let (saved, slugs) = {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| RecycloseError::storage("saved items lock poisoned"))?;

            let mut slugs = self.read_slugs()?;
            let saved = if let Some(pos) = slugs.iter().position(|s| s == slug) {
                slugs.remove(pos);
                false
            } else {
                slugs.push(slug.to_string());
                true
            };
            self.write(&slugs)?;
            (saved, slugs)
        };

        debug!(slug, saved, "Toggled saved item");
        self.notify(&slugs);
        Ok(saved)
    }

    /// Remove every saved slug
    pub fn clear(&self) -> Result<()> {
        {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| RecycloseError::storage("saved items lock poisoned"))?;
            self.write(&[])?;
        }
        self.notify(&[]);
        Ok(())
    }

    /// Register a callback invoked with the new list after each write.
    /// Callbacks run after the write lock is released.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut entries) = self.listeners.entries.lock() {
            entries.insert(id, Arc::new(callback));
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn write(&self, slugs: &[String]) -> Result<()> {
        let raw = serde_json::to_string(slugs)
            .map_err(|e| RecycloseError::storage(format!("failed to encode saved items: {e}")))?;
        self.backend.set(SAVED_KEY, &raw)
    }

    fn notify(&self, slugs: &[String]) {
        // Snapshot so callbacks may subscribe or unsubscribe
        let listeners: Vec<Listener> = match self.listeners.entries.lock() {
            Ok(entries) => entries.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(slugs);
        }
    }
}

/// Initializes the process-wide saved store. **Must be called once before use.**
pub fn init(store: SavedStore) -> Result<()> {
    GLOBAL_SAVED
        .set(store)
        .map_err(|_| RecycloseError::general("Saved store already initialized"))?;
    Ok(())
}

/// Returns the process-wide saved store, if [`init`] has run
#[must_use]
pub fn store() -> Option<&'static SavedStore> {
    GLOBAL_SAVED.get()
}
