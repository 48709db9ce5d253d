//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use crate::cache::CacheValue;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: CacheValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now` - Current time in Unix milliseconds
    /// * `expires_at` - Optional absolute expiry in Unix milliseconds
    pub fn new(value: CacheValue, now: u64, expires_at: Option<u64>) -> Self {
        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }
}

// == Utility Functions ==
/// Converts a TTL in seconds to an absolute expiry in milliseconds.
///
/// A non-positive TTL disables expiration. Returns `None` on overflow.
pub(crate) fn expiry_from_ttl(now: u64, ttl_seconds: i64) -> Option<Option<u64>> {
    if ttl_seconds <= 0 {
        return Some(None);
    }
    let ttl_ms = u64::try_from(ttl_seconds).ok()?.checked_mul(1000)?;
    now.checked_add(ttl_ms).map(Some)
}
