//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction and typed
//! containers (hash, list, set).

mod clock;
mod engine;
mod entry;
mod expiry;
mod hash_ops;
mod list_ops;
mod lru;
mod set_ops;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Cache;
pub use entry::CacheEntry;
pub use expiry::ExpirationIndex;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, TtlStatus};
pub use value::{CacheValue, ValueKind};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
