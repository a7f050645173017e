//! Refresh-interval cache over a store

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use super::Store;

/// Source of the current time.
pub type Clock = Box<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug, Default)]
struct Snapshot {
    version: u64,
    config: HashMap<String, String>,
    refreshed: Option<Instant>,
}

/// Caches the full config of a store.
///
/// `get_since(0)` and `get_since` of the cached version are answered from
/// the cache and refreshed with a delta from the inner store at most once
/// per refresh interval. Other versions, `set` and `history` go straight to
/// the inner store.
pub struct CachedStore<S> {
    inner: S,
    refresh: Duration,
    clock: Clock,
    snapshot: Mutex<Snapshot>,
}

impl<S: Store> CachedStore<S> {
    /// Wrap `inner` using the system clock.
    pub fn new(inner: S, refresh: Duration) -> Self {
        Self::with_clock(inner, refresh, Box::new(Instant::now))
    }

    /// Wrap `inner` with an explicit clock.
    pub fn with_clock(inner: S, refresh: Duration, clock: Clock) -> Self {
        Self {
            inner,
            refresh,
            clock,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for CachedStore<S> {
    fn get_since(&self, version: u64) -> (u64, HashMap<String, String>) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        if version > 0 && version != snapshot.version {
            return self.inner.get_since(version);
        }

        let now = (self.clock)();
        let fresh = snapshot
            .refreshed
            .is_some_and(|at| now.saturating_duration_since(at) < self.refresh);
        if fresh {
            return (snapshot.version, snapshot.config.clone());
        }

        let (newest, changed) = self.inner.get_since(snapshot.version);
        debug!(
            from = snapshot.version,
            to = newest,
            changed = changed.len(),
            "refreshed config cache"
        );
        snapshot.config.extend(changed);
        snapshot.version = newest;
        snapshot.refreshed = Some(now);
        (snapshot.version, snapshot.config.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value)
    }

    fn history(&self, key: &str, epoch: &str) -> (String, Vec<String>) {
        self.inner.history(key, epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MemoryStore;
    use std::sync::Arc;

    fn manual_clock() -> (Arc<Mutex<Instant>>, Clock) {
        let now = Arc::new(Mutex::new(Instant::now()));
        let reader = Arc::clone(&now);
        (now, Box::new(move || *reader.lock().unwrap()))
    }

    #[test]
    fn test_serves_from_cache_until_refresh() {
        let store = Arc::new(MemoryStore::from_entries([("a", "1")]));
        let (now, clock) = manual_clock();
        let cached = CachedStore::with_clock(Arc::clone(&store), Duration::from_secs(1), clock);

        assert_eq!(cached.get_since(0).1.get("a").map(String::as_str), Some("1"));

        store.set("a", "2");
        assert_eq!(cached.get_since(0).1.get("a").map(String::as_str), Some("1"));

        *now.lock().unwrap() += Duration::from_secs(2);
        let (version, config) = cached.get_since(0);
        assert_eq!(version, 2);
        assert_eq!(config.get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_other_versions_pass_through() {
        let store = MemoryStore::from_entries([("a", "1"), ("b", "2")]);
        let cached = CachedStore::new(store, Duration::from_secs(60));
        let (version, all) = cached.get_since(0);
        assert_eq!((version, all.len()), (2, 2));

        let (version, changed) = cached.get_since(1);
        assert_eq!(version, 2);
        assert_eq!(changed.len(), 1);

        cached.set("c", "3");
        assert_eq!(cached.inner().version(), 3);
        assert_eq!(cached.history("c", "").1, vec!["3".to_string()]);
    }
}
