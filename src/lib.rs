//! Mini Cache - An embeddable in-memory cache engine
//!
//! Provides Redis-like operations (strings, counters, hashes, lists, sets)
//! with TTL expiration and LRU eviction, behind a thread-safe handle.

pub mod cache;
pub mod config;
pub mod error;
pub mod messaging;
pub mod tasks;

pub use cache::{Cache, CacheStats, CacheValue, TtlStatus, ValueKind};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
