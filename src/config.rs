//! Configuration Module
//!
//! Handles loading and managing engine configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Maximum expired keys removed per lock acquisition during a sweep
    pub sweep_batch_size: usize,
    /// How long, in seconds, the message receiver remembers a delivered id
    pub dedup_ttl: i64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `SWEEP_BATCH_SIZE` - Keys removed per sweep batch (default: 256)
    /// - `DEDUP_TTL` - Message deduplication window in seconds (default: 60)
    ///
    /// Unparseable or zero values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: positive_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: positive_var("CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            sweep_batch_size: positive_var("SWEEP_BATCH_SIZE")
                .unwrap_or(defaults.sweep_batch_size),
            dedup_ttl: positive_var("DEDUP_TTL").unwrap_or(defaults.dedup_ttl),
        }
    }
}

fn positive_var<T>(name: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v: &T| *v > T::default())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            cleanup_interval: 1,
            sweep_batch_size: 256,
            dedup_ttl: 60,
        }
    }
}
