//! TTL-Aware Key-Value Store
//!
//! A single `HashMap` behind a readers-writer lock. Every command entry
//! point (`set`, `get`, `sweep_expired`) takes the **write** lock, because
//! each of them can delete an entry:
//!
//! ```text
//!   set ──────────┐
//!   get ──────────┼──> RwLock::write() ──> HashMap<Bytes, Entry>
//!   sweep_expired ┘
//! ```
//!
//! `get` in particular checks the deadline and removes an expired entry in
//! the same critical section. Taking a read lock first and upgrading later
//! would let another writer slip in between the check and the delete.
//!
//! The read lock is only used by introspection (`len`, `contains_raw`),
//! which never touches expiry.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// A stored value with its optional expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The stored value
    pub value: Bytes,
    /// Absolute deadline (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates an entry that never expires.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates an entry that expires `ttl` from now.
    ///
    /// A deadline too far out to represent is treated as no deadline.
    pub fn with_ttl(value: Bytes, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    /// Checks whether the entry is dead at `now`.
    ///
    /// The entry is still alive at exactly its deadline.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    /// Checks whether the entry is dead right now.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// The process-wide key-value store.
///
/// Wrap it in an `Arc` and hand a clone to every connection and to the
/// janitor. All methods take `&self`.
///
/// # Example
///
/// ```
/// use litekv::storage::Store;
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// let store = Store::new();
///
/// store.set(Bytes::from("name"), Bytes::from("Ariel"), None);
/// assert_eq!(store.get(&Bytes::from("name")), Some(Bytes::from("Ariel")));
///
/// store.set(Bytes::from("session"), Bytes::from("abc123"), Some(Duration::from_secs(60)));
/// assert!(store.get(&Bytes::from("session")).is_some());
/// ```
#[derive(Default)]
pub struct Store {
    data: RwLock<HashMap<Bytes, Entry>>,
    counters: Counters,
}

/// Relaxed operation counters, read only for logging and tests.
#[derive(Debug, Default)]
struct Counters {
    sets: AtomicU64,
    gets: AtomicU64,
    hits: AtomicU64,
    expired_lazy: AtomicU64,
    expired_swept: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.len())
            .field("counters", &self.counters)
            .finish()
    }
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // No critical section leaves the map half-updated, so a panic in
    // another holder does not invalidate it.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Entry>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Entry>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// With `ttl = None` the entry never expires. The previous entry's
    /// deadline is never carried over.
    pub fn set(&self, key: Bytes, value: Bytes, ttl: Option<Duration>) {
        self.counters.sets.fetch_add(1, Ordering::Relaxed);

        let entry = match ttl {
            Some(ttl) => Entry::with_ttl(value, ttl),
            None => Entry::new(value),
        };

        self.write().insert(key, entry);
    }

    /// Looks up `key`.
    ///
    /// Returns `None` if the key is missing or expired. An expired entry is
    /// removed by this call, so it can never be read again.
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.counters.gets.fetch_add(1, Ordering::Relaxed);

        let mut data = self.write();
        let entry = data.get(key)?;

        if entry.is_expired() {
            data.remove(key);
            self.counters.expired_lazy.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value.clone())
    }

    /// Removes every expired entry. Called by the janitor.
    ///
    /// Scans the whole map while holding the write lock.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut data = self.write();

        let before = data.len();
        data.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - data.len();

        if removed > 0 {
            self.counters
                .expired_swept
                .fetch_add(removed as u64, Ordering::Relaxed);
        }

        removed
    }

    /// Number of entries physically held, including expired entries that
    /// nobody has read or swept yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the map holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether an entry is physically present, expired or not.
    ///
    /// Does not perform lazy expiry; meant for diagnostics and tests.
    pub fn contains_raw(&self, key: &Bytes) -> bool {
        self.read().contains_key(key)
    }

    /// Returns a snapshot of the operation counters.
    pub fn stats(&self) -> StoreStats {
        let gets = self.counters.gets.load(Ordering::Relaxed);
        let hits = self.counters.hits.load(Ordering::Relaxed);

        StoreStats {
            keys: self.len(),
            sets: self.counters.sets.load(Ordering::Relaxed),
            gets,
            hits,
            misses: gets.saturating_sub(hits),
            expired_lazy: self.counters.expired_lazy.load(Ordering::Relaxed),
            expired_swept: self.counters.expired_swept.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries currently held (including unswept expired ones)
    pub keys: usize,
    /// Total `set` calls
    pub sets: u64,
    /// Total `get` calls
    pub gets: u64,
    /// `get` calls that returned a value
    pub hits: u64,
    /// `get` calls that returned nothing
    pub misses: u64,
    /// Entries removed by `get` on access
    pub expired_lazy: u64,
    /// Entries removed by `sweep_expired`
    pub expired_swept: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_and_get() {
        let store = Store::new();

        store.set(Bytes::from("key"), Bytes::from("value"), None);
        assert_eq!(store.get(&Bytes::from("key")), Some(Bytes::from("value")));
    }

    #[test]
    fn test_get_missing_has_no_side_effect() {
        let store = Store::new();

        for _ in 0..3 {
            assert_eq!(store.get(&Bytes::from("missing")), None);
        }
        assert!(store.is_empty());
        assert_eq!(store.stats().misses, 3);
    }

    #[test]
    fn test_entry_deadline_is_inclusive() {
        let entry = Entry::with_ttl(Bytes::from("v"), Duration::from_secs(5));
        let deadline = entry.expires_at.unwrap();

        assert!(!entry.is_expired_at(deadline));
        assert!(entry.is_expired_at(deadline + Duration::from_nanos(1)));
        assert!(!Entry::new(Bytes::from("v")).is_expired_at(deadline + Duration::from_secs(3600)));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let entry = Entry::with_ttl(Bytes::from("v"), Duration::MAX);
        assert_eq!(entry.expires_at, None);
    }

    #[test]
    fn test_lazy_expiry_removes_entry() {
        let store = Store::new();

        store.set(
            Bytes::from("key"),
            Bytes::from("value"),
            Some(Duration::from_millis(50)),
        );
        assert_eq!(store.get(&Bytes::from("key")), Some(Bytes::from("value")));

        thread::sleep(Duration::from_millis(100));

        // Still physically there until someone looks at it
        assert!(store.contains_raw(&Bytes::from("key")));
        assert_eq!(store.get(&Bytes::from("key")), None);
        assert!(!store.contains_raw(&Bytes::from("key")));
        assert_eq!(store.stats().expired_lazy, 1);
    }

    #[test]
    fn test_overwrite_clears_previous_ttl() {
        let store = Store::new();

        store.set(
            Bytes::from("key"),
            Bytes::from("old"),
            Some(Duration::from_millis(30)),
        );
        store.set(Bytes::from("key"), Bytes::from("new"), None);

        thread::sleep(Duration::from_millis(60));

        assert_eq!(store.get(&Bytes::from("key")), Some(Bytes::from("new")));
    }

    #[test]
    fn test_overwrite_adds_ttl() {
        let store = Store::new();

        store.set(Bytes::from("key"), Bytes::from("old"), None);
        store.set(
            Bytes::from("key"),
            Bytes::from("new"),
            Some(Duration::from_millis(30)),
        );

        thread::sleep(Duration::from_millis(60));

        assert_eq!(store.get(&Bytes::from("key")), None);
    }

    #[test]
    fn test_sweep_expired() {
        let store = Store::new();

        store.set(
            Bytes::from("key1"),
            Bytes::from("value1"),
            Some(Duration::from_millis(10)),
        );
        store.set(
            Bytes::from("key2"),
            Bytes::from("value2"),
            Some(Duration::from_millis(10)),
        );
        store.set(
            Bytes::from("key3"),
            Bytes::from("value3"),
            Some(Duration::from_secs(60)),
        );
        store.set(Bytes::from("key4"), Bytes::from("value4"), None);

        thread::sleep(Duration::from_millis(50));

        assert_eq!(store.sweep_expired(), 2);
        assert_eq!(store.len(), 2);
        assert!(store.contains_raw(&Bytes::from("key3")));
        assert!(store.contains_raw(&Bytes::from("key4")));
        assert_eq!(store.sweep_expired(), 0);
        assert_eq!(store.stats().expired_swept, 2);
    }

    #[test]
    fn test_concurrent_distinct_keys() {
        let store = Arc::new(Store::new());

        let writers: Vec<_> = (0..16)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..500 {
                        store.set(
                            Bytes::from(format!("key-{}-{}", t, i)),
                            Bytes::from(format!("value-{}-{}", t, i)),
                            None,
                        );
                    }
                })
            })
            .collect();
        for handle in writers {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 16 * 500);

        let readers: Vec<_> = (0..16)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..500 {
                        let value = store.get(&Bytes::from(format!("key-{}-{}", t, i)));
                        assert_eq!(value, Some(Bytes::from(format!("value-{}-{}", t, i))));
                    }
                })
            })
            .collect();
        for handle in readers {
            handle.join().unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.sets, 8000);
        assert_eq!(stats.hits, 8000);
    }

    #[test]
    fn test_concurrent_get_and_sweep_agree() {
        // Readers racing the sweeper must never see an expired value.
        let store = Arc::new(Store::new());
        for i in 0..1000 {
            store.set(
                Bytes::from(format!("k{}", i)),
                Bytes::from("v"),
                Some(Duration::from_millis(5)),
            );
        }
        thread::sleep(Duration::from_millis(20));

        let sweeper = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.sweep_expired())
        };
        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..1000)
                    .filter(|i| store.get(&Bytes::from(format!("k{}", i))).is_some())
                    .count()
            })
        };

        let swept = sweeper.join().unwrap();
        assert_eq!(reader.join().unwrap(), 0);

        let stats = store.stats();
        assert_eq!(swept as u64 + stats.expired_lazy, 1000);
        assert!(store.is_empty());
    }
}
