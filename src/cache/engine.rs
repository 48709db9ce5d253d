//! Cache Engine Module
//!
//! Thread-safe handle over [`CacheStore`]. Every operation takes the single
//! store lock for its whole duration, so no two operations interleave.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::cache::{CacheStats, CacheStore, CacheValue, Clock, TtlStatus};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache ==
/// Shared in-process cache engine.
///
/// Cloning is cheap and every clone sees the same entries. The engine is
/// created explicitly and released when the last clone is dropped.
///
/// TTL arguments are whole seconds. When storing a value, zero or negative
/// means "never expires"; when updating an existing key it leaves the current
/// expiry alone.
///
/// # Example
/// ```
/// use mini_cache::Cache;
///
/// let cache = Cache::new(2);
/// cache.set("a", "1").unwrap();
/// cache.set("b", "2").unwrap();
/// cache.set("c", "3").unwrap();
///
/// assert!(cache.get("a").is_none());
/// assert_eq!(cache.increment("hits", 5).unwrap(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<Mutex<CacheStore>>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self::from_store(CacheStore::new(capacity))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self::from_store(CacheStore::with_clock(capacity, clock))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries)
    }

    fn from_store(store: CacheStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock()
    }

    // == Scalar Operations ==

    /// Stores `value` under `key` without expiry.
    pub fn set(&self, key: &str, value: impl Into<CacheValue>) -> Result<()> {
        self.set_with_ttl(key, value, 0)
    }

    /// Stores `value` under `key`, expiring after `ttl_seconds`.
    pub fn set_with_ttl(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        ttl_seconds: i64,
    ) -> Result<()> {
        self.lock().put(key, value.into(), ttl_seconds)
    }

    /// Returns a copy of the live value under `key`.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.lock().get(key).cloned()
    }

    /// Returns the scalar under `key` as a string. Containers read as `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.lock()
            .get(key)
            .and_then(|value| value.as_str().map(str::to_string))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.lock().exists(key)
    }

    /// Deletes the given keys and returns how many existed.
    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> usize {
        self.lock().delete(keys)
    }

    /// Sets a new TTL on an existing key. Returns `false` if the key is absent.
    ///
    /// A non-positive `ttl_seconds` changes nothing.
    pub fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool> {
        self.lock().expire(key, ttl_seconds)
    }

    pub fn ttl(&self, key: &str) -> TtlStatus {
        self.lock().ttl(key)
    }

    // == Counters ==

    /// Adds `delta` to the integer under `key`, starting from 0 if absent.
    ///
    /// `delta` is a magnitude: negative values are rejected rather than
    /// turned into a decrement.
    pub fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.apply_delta(key, require_magnitude(delta)?)
    }

    /// Subtracts `delta` from the integer under `key`, starting from 0 if
    /// absent. Negative magnitudes are rejected.
    pub fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        self.apply_delta(key, -require_magnitude(delta)?)
    }

    fn apply_delta(&self, key: &str, amount: i64) -> Result<i64> {
        let mut store = self.lock();
        match store.get_mut(key) {
            Some(value) => {
                let next = checked_add(key, value.as_integer(key)?, amount)?;
                // Existing TTL is kept
                *value = CacheValue::from(next);
                Ok(next)
            }
            None => {
                store.put(key, CacheValue::from(amount), 0)?;
                Ok(amount)
            }
        }
    }

    // == Introspection ==

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Removes up to `limit` expired entries under one lock acquisition.
    pub fn purge_expired(&self, limit: usize) -> usize {
        self.lock().purge_expired(limit)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Validates a caller-supplied magnitude.
pub(super) fn require_magnitude(delta: i64) -> Result<i64> {
    if delta < 0 {
        return Err(CacheError::invalid(format!(
            "delta must be non-negative, got {}",
            delta
        )));
    }
    Ok(delta)
}

pub(super) fn checked_add(key: &str, current: i64, amount: i64) -> Result<i64> {
    current
        .checked_add(amount)
        .ok_or_else(|| CacheError::invalid(format!("integer overflow at key '{}'", key)))
}
