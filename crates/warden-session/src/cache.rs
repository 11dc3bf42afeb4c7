//! Cache of verified login sessions keyed by server-session identifier.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};

/// Entry stored in the cache.
///
/// An entry exists only for a session that was confirmed valid against the
/// host's session store at `verified_at`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached session value.
    pub value: V,

    /// When the session was last confirmed valid.
    pub verified_at: DateTime<Utc>,
}

/// Process-local cache of verified sessions.
///
/// Maps the host's session identifier to a [`CacheEntry`]. Lookups are O(1)
/// and every operation is a short synchronous map access under one lock;
/// nothing here performs I/O. The cache is unbounded: entries leave only
/// through [`remove`](Self::remove) when re-verification fails or a
/// collaborator invalidates them.
///
/// Clones share the same underlying state, so the cache can be handed to
/// every request handler.
pub struct SessionCache<V> {
    inner: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync + 'static> SessionCache<V> {
    /// Create an empty cache stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache with an injected time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Look up an entry. Pure read: LRU-free, timestamp untouched.
    pub fn lookup(&self, session_id: &str) -> Option<CacheEntry<V>> {
        let inner = self.inner.read();
        let entry = inner.get(session_id).cloned();
        trace!(session_id = %session_id, hit = entry.is_some(), "cache lookup");
        entry
    }

    /// Insert or replace the entry for `session_id` with a fresh timestamp.
    pub fn insert(&self, session_id: &str, value: V) {
        let entry = CacheEntry {
            value,
            verified_at: self.clock.now(),
        };
        let mut inner = self.inner.write();
        let replaced = inner.insert(session_id.to_string(), entry).is_some();
        debug!(
            session_id = %session_id,
            replaced = replaced,
            cache_size = inner.len(),
            "session cached"
        );
    }

    /// Refresh the timestamp of an existing entry without touching its value.
    ///
    /// Returns false when no entry exists for `session_id`.
    pub fn touch(&self, session_id: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.get_mut(session_id) {
            Some(entry) => {
                entry.verified_at = self.clock.now();
                trace!(session_id = %session_id, "cache entry touched");
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `session_id`, returning its value if present.
    pub fn remove(&self, session_id: &str) -> Option<V> {
        let mut inner = self.inner.write();
        let removed = inner.remove(session_id);
        if removed.is_some() {
            debug!(session_id = %session_id, cache_size = inner.len(), "session evicted");
        }
        removed.map(|e| e.value)
    }

    /// Current number of cached sessions.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        let count = inner.len();
        inner.clear();
        if count > 0 {
            debug!(count = count, "session cache cleared");
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Default for SessionCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for SessionCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    #[test]
    fn test_insert_and_lookup() {
        let cache = SessionCache::new();

        cache.insert("session-1", "alice".to_string());

        let entry = cache.lookup("session-1").unwrap();
        assert_eq!(entry.value, "alice");
        assert!(cache.lookup("session-2").is_none());
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let cache = SessionCache::new();

        cache.insert("session-1", "alice".to_string());
        cache.insert("session-1", "bob".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("session-1").unwrap().value, "bob");
    }

    #[test]
    fn test_remove() {
        let cache = SessionCache::new();

        cache.insert("session-1", "alice".to_string());
        assert_eq!(cache.remove("session-1"), Some("alice".to_string()));
        assert!(cache.lookup("session-1").is_none());
        assert_eq!(cache.remove("session-1"), None);
    }

    #[test]
    fn test_operations_do_not_affect_other_keys() {
        let cache = SessionCache::new();

        cache.insert("session-1", "alice".to_string());
        cache.insert("session-2", "bob".to_string());

        cache.remove("session-1");
        cache.touch("session-2");

        assert!(cache.lookup("session-1").is_none());
        assert_eq!(cache.lookup("session-2").unwrap().value, "bob");
    }

    #[test]
    fn test_touch_refreshes_timestamp_only() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = SessionCache::with_clock(clock.clone());

        cache.insert("session-1", "alice".to_string());
        let before = cache.lookup("session-1").unwrap().verified_at;

        clock.advance(Duration::seconds(10));
        assert!(cache.touch("session-1"));

        let entry = cache.lookup("session-1").unwrap();
        assert_eq!(entry.verified_at, before + Duration::seconds(10));
        assert!(entry.verified_at > before);
        assert_eq!(entry.value, "alice");
    }

    #[test]
    fn test_touch_missing_entry() {
        let cache: SessionCache<String> = SessionCache::new();
        assert!(!cache.touch("nonexistent"));
    }

    #[test]
    fn test_lookup_does_not_mutate_timestamp() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = SessionCache::with_clock(clock.clone());

        cache.insert("session-1", "alice".to_string());
        let before = cache.lookup("session-1").unwrap().verified_at;

        clock.advance(Duration::seconds(60));
        let after = cache.lookup("session-1").unwrap().verified_at;

        assert_eq!(before, after);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = SessionCache::new();
        let other = cache.clone();

        cache.insert("session-1", "alice".to_string());
        assert_eq!(other.lookup("session-1").unwrap().value, "alice");

        other.remove("session-1");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = SessionCache::new();

        cache.insert("session-1", "alice".to_string());
        cache.insert("session-2", "bob".to_string());
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.lookup("session-1").is_none());
    }
}
