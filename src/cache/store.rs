//! Cache Store Module
//!
//! Entry storage combining a HashMap with LRU tracking and an expiration
//! index. Not synchronized; [`Cache`](crate::cache::Cache) wraps it in a lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::entry::expiry_from_ttl;
use crate::cache::stats::{StatCounters, StatEvent};
use crate::cache::{
    CacheEntry, CacheStats, CacheValue, Clock, ExpirationIndex, LruTracker, SystemClock,
    ValueKind, MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::{CacheError, Result};

// == TTL Status ==
/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlStatus {
    /// Key is absent or expired
    Missing,
    /// Key exists without an expiry
    Persistent,
    /// Key expires after the given duration
    Expires(Duration),
}

// == Cache Store ==
/// Capacity-bounded key/entry map with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Scheduled expirations
    expiry: ExpirationIndex,
    /// Hit/miss/eviction/expiration totals
    stats: StatCounters,
    /// Maximum number of entries allowed
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore on the system clock.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expiry: ExpirationIndex::new(),
            stats: StatCounters::default(),
            capacity: capacity.max(1),
            clock,
        }
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Put ==
    /// Stores a value, overwriting any existing entry and resetting recency.
    ///
    /// A non-positive `ttl_seconds` stores the entry without expiry. Admitting
    /// a new key at capacity first reclaims expired entries, then evicts the
    /// least recently used one.
    pub fn put(&mut self, key: &str, value: CacheValue, ttl_seconds: i64) -> Result<()> {
        validate_key(key)?;
        if value.byte_size() > MAX_VALUE_SIZE {
            return Err(CacheError::invalid(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let now = self.now();
        let expires_at = deadline_from(now, ttl_seconds)?;

        self.expire_if_due(key, now);
        if !self.entries.contains_key(key) {
            self.make_room(now);
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, now, expires_at));
        match expires_at {
            Some(at) => self.expiry.schedule(key, at),
            None => {
                self.expiry.cancel(key);
            }
        }
        self.lru.touch(key);

        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`, recording a hit and touching recency.
    ///
    /// Expired entries are removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<&CacheValue> {
        if !self.is_live(key) {
            self.stats.record(StatEvent::Miss);
            return None;
        }
        self.stats.record(StatEvent::Hit);
        self.lru.touch(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Mutable access to a live value. Touches recency but does not count
    /// toward hit/miss statistics.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheValue> {
        if !self.is_live(key) {
            return None;
        }
        self.lru.touch(key);
        self.entries.get_mut(key).map(|entry| &mut entry.value)
    }

    /// Returns the live value for `key`, creating an empty value of `kind`
    /// without expiry if absent.
    pub fn get_or_create(&mut self, key: &str, kind: ValueKind) -> Result<&mut CacheValue> {
        validate_key(key)?;
        let now = self.now();
        self.expire_if_due(key, now);

        if let Some(entry) = self.entries.get(key) {
            if entry.value.kind() != kind {
                return Err(entry.value.mismatch(key, kind));
            }
        } else {
            self.make_room(now);
            self.entries.insert(
                key.to_string(),
                CacheEntry::new(CacheValue::empty(kind), now, None),
            );
        }

        self.lru.touch(key);
        self.entries
            .get_mut(key)
            .map(|entry| &mut entry.value)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Delete ==
    /// Removes the given keys. Returns how many live entries were removed.
    pub fn delete<K: AsRef<str>>(&mut self, keys: &[K]) -> usize {
        let now = self.now();
        keys.iter()
            .filter(|key| {
                let key: &str = key.as_ref();
                !self.expire_if_due(key, now) && self.remove_entry(key).is_some()
            })
            .count()
    }

    /// Drops `key` if it holds a container with no elements.
    pub fn remove_if_empty(&mut self, key: &str) {
        let empty = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.value.is_empty_container());
        if empty {
            self.remove_entry(key);
        }
    }

    // == Exists ==
    /// Checks whether `key` is live without touching recency.
    pub fn exists(&mut self, key: &str) -> bool {
        self.is_live(key)
    }

    // == Expire ==
    /// Reschedules the expiry of a live key.
    ///
    /// A non-positive `ttl_seconds` leaves the current expiry untouched.
    /// Returns `false` if the key is absent.
    pub fn expire(&mut self, key: &str, ttl_seconds: i64) -> Result<bool> {
        let deadline = self.deadline(ttl_seconds)?;
        Ok(self.expire_at(key, deadline))
    }

    /// Converts `ttl_seconds` into an absolute deadline in Unix milliseconds.
    ///
    /// `None` means no expiry. Lets callers reject a bad TTL before they
    /// mutate anything.
    pub fn deadline(&self, ttl_seconds: i64) -> Result<Option<u64>> {
        deadline_from(self.now(), ttl_seconds)
    }

    /// Applies a deadline from [`deadline`](Self::deadline) to a live key.
    ///
    /// `None` keeps whatever expiry the key already has. Returns `false` if
    /// the key is absent.
    pub fn expire_at(&mut self, key: &str, deadline: Option<u64>) -> bool {
        let now = self.now();
        self.expire_if_due(key, now);
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if let Some(at) = deadline {
            entry.expires_at = Some(at);
            self.expiry.schedule(key, at);
        }
        true
    }

    // == TTL ==
    /// Reports the remaining lifetime of `key`.
    pub fn ttl(&mut self, key: &str) -> TtlStatus {
        let now = self.now();
        self.expire_if_due(key, now);
        match self.entries.get(key) {
            None => TtlStatus::Missing,
            Some(entry) => match entry.ttl_remaining_ms(now) {
                None => TtlStatus::Persistent,
                Some(ms) => TtlStatus::Expires(Duration::from_millis(ms)),
            },
        }
    }

    // == Purge Expired ==
    /// Removes up to `limit` expired entries, earliest deadline first.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self, limit: usize) -> usize {
        let now = self.now();
        let expired = self.expiry.pop_expired(now, limit);
        let count = expired.len();

        for key in expired {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        self.stats.record(StatEvent::Expired(count));
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Returns the current number of entries, including expired ones not
    /// yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.expiry.clear();
    }

    fn is_live(&mut self, key: &str) -> bool {
        let now = self.now();
        !self.expire_if_due(key, now) && self.entries.contains_key(key)
    }

    /// Removes `key` if its TTL has elapsed. Returns whether it did.
    fn expire_if_due(&mut self, key: &str, now: u64) -> bool {
        let due = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));
        if due {
            self.remove_entry(key);
            self.stats.record(StatEvent::Expired(1));
            debug!(key, "expired entry removed on access");
        }
        due
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.expiry.cancel(key);
        Some(entry)
    }

    /// Frees one slot for a new key when the store is full.
    fn make_room(&mut self, now: u64) {
        while self.entries.len() >= self.capacity {
            if let Some(key) = self.expiry.pop_expired(now, 1).pop() {
                self.entries.remove(&key);
                self.lru.remove(&key);
                self.stats.record(StatEvent::Expired(1));
                continue;
            }
            match self.lru.evict_one() {
                Some(key) => {
                    self.entries.remove(&key);
                    self.expiry.cancel(&key);
                    self.stats.record(StatEvent::Eviction);
                    debug!(key = %key, "evicted least recently used entry");
                }
                None => break,
            }
        }
    }
}

fn deadline_from(now: u64, ttl_seconds: i64) -> Result<Option<u64>> {
    expiry_from_ttl(now, ttl_seconds)
        .ok_or_else(|| CacheError::invalid(format!("TTL {}s overflows", ttl_seconds)))
}

fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::invalid(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
