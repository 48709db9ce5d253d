//! Statistics
//!
//! The store bumps [`StatCounters`] as events happen; callers only ever see a
//! [`CacheStats`] snapshot taken under the engine lock.

use serde::Serialize;

/// Something the store counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatEvent {
    /// A read found a live entry
    Hit,
    /// A read found nothing, or only an expired entry
    Miss,
    /// A live entry was dropped to admit a new key
    Eviction,
    /// This many entries were removed because their TTL elapsed
    Expired(usize),
}

/// Running totals owned by the store.
#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl StatCounters {
    pub(crate) fn record(&mut self, event: StatEvent) {
        match event {
            StatEvent::Hit => self.hits += 1,
            StatEvent::Miss => self.misses += 1,
            StatEvent::Eviction => self.evictions += 1,
            StatEvent::Expired(count) => self.expirations += count as u64,
        }
    }

    /// Freezes the totals alongside the current entry count.
    pub(crate) fn snapshot(&self, total_entries: usize) -> CacheStats {
        let reads = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            expirations: self.expirations,
            total_entries,
            hit_rate: if reads == 0 {
                0.0
            } else {
                self.hits as f64 / reads as f64
            },
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the engine's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Entries held when the snapshot was taken, expired ones not yet
    /// reclaimed included
    pub total_entries: usize,
    /// `hits / (hits + misses)`, or 0.0 before the first read
    pub hit_rate: f64,
}
