//! Versioned key/value stores

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tracing::trace;

/// Storage for config entries.
///
/// Every `set` gets the next global version, starting at 1.
pub trait Store: Send + Sync {
    /// The latest entry of every key changed after `version`, plus the
    /// newest version seen. Version 0 fetches everything. When nothing
    /// changed the given version is returned with an empty map.
    fn get_since(&self, version: u64) -> (u64, HashMap<String, String>);

    /// Store a new entry for `key`.
    fn set(&self, key: &str, value: &str);

    /// Entries of `key` in reverse chronological order, starting at
    /// `epoch` (the empty string starts at the newest). The returned epoch
    /// continues the walk and is empty once there is nothing older.
    fn history(&self, key: &str, epoch: &str) -> (String, Vec<String>);
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get_since(&self, version: u64) -> (u64, HashMap<String, String>) {
        (**self).get_since(version)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn history(&self, key: &str, epoch: &str) -> (String, Vec<String>) {
        (**self).history(key, epoch)
    }
}

/// In-memory versioned store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Per-key history, oldest first
    entries: DashMap<String, Vec<(u64, String)>>,

    /// Last assigned version; held while writing so versions stay ordered
    version: Mutex<u64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and `set` each entry in order.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let store = Self::new();
        for (key, value) in entries {
            store.set(key.as_ref(), value.as_ref());
        }
        store
    }

    /// The last assigned version.
    pub fn version(&self) -> u64 {
        *self.version.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn get_since(&self, version: u64) -> (u64, HashMap<String, String>) {
        // writers hold the version lock, so the scan sees a single snapshot
        let _writers = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        let mut newest = version;
        let mut changed = HashMap::new();
        for entry in self.entries.iter() {
            if let Some((ver, value)) = entry.value().last() {
                if *ver > version {
                    newest = newest.max(*ver);
                    changed.insert(entry.key().clone(), value.clone());
                }
            }
        }
        (newest, changed)
    }

    fn set(&self, key: &str, value: &str) {
        let mut version = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        *version += 1;
        trace!(key, version = *version, "set");
        self.entries
            .entry(key.to_string())
            .or_default()
            .push((*version, value.to_string()));
    }

    fn history(&self, key: &str, epoch: &str) -> (String, Vec<String>) {
        let max = if epoch.is_empty() {
            u64::MAX
        } else {
            match epoch.parse::<u64>() {
                Ok(max) => max,
                Err(_) => return (String::new(), Vec::new()),
            }
        };
        let Some(entries) = self.entries.get(key) else {
            return (String::new(), Vec::new());
        };

        let older: Vec<&(u64, String)> =
            entries.iter().rev().filter(|(ver, _)| *ver <= max).collect();
        let next = match older.last() {
            Some((oldest, _)) => (oldest - 1).to_string(),
            None => String::new(),
        };
        (next, older.into_iter().map(|(_, value)| value.clone()).collect())
    }
}
