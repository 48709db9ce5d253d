//! Expiration Index Module
//!
//! Orders keys by absolute expiry so the next deadline can be found without
//! scanning the whole store.

use std::collections::{BTreeSet, HashMap};

/// Position of a key in the index: expiry first, then insertion sequence.
type Slot = (u64, u64);

// == Expiration Index ==
/// Min-ordered index of scheduled expirations.
///
/// Ties on the same timestamp pop in insertion order.
#[derive(Debug, Default)]
pub struct ExpirationIndex {
    queue: BTreeSet<(u64, u64, String)>,
    slots: HashMap<String, Slot>,
    next_seq: u64,
}

impl ExpirationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // == Schedule ==
    /// Schedules `key` to expire at `expires_at`, replacing any earlier slot.
    pub fn schedule(&mut self, key: &str, expires_at: u64) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((expires_at, seq, key.to_string()));
        self.slots.insert(key.to_string(), (expires_at, seq));
    }

    // == Cancel ==
    /// Removes any scheduled expiry for `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.slots.remove(key) {
            Some((expires_at, seq)) => {
                self.queue.remove(&(expires_at, seq, key.to_string()));
                true
            }
            None => false,
        }
    }

    // == Pop Expired ==
    /// Removes and returns up to `limit` keys whose expiry is `<= now`,
    /// earliest first.
    pub fn pop_expired(&mut self, now: u64, limit: usize) -> Vec<String> {
        let mut expired = Vec::new();
        while expired.len() < limit {
            match self.queue.first() {
                Some((expires_at, _, _)) if *expires_at <= now => {}
                _ => break,
            }
            if let Some((_, _, key)) = self.queue.pop_first() {
                self.slots.remove(&key);
                expired.push(key);
            }
        }
        expired
    }

    /// Earliest scheduled expiry, if any.
    pub fn next_expiry(&self) -> Option<u64> {
        self.queue.first().map(|(expires_at, _, _)| *expires_at)
    }

    pub fn expiry_of(&self, key: &str) -> Option<u64> {
        self.slots.get(key).map(|(expires_at, _)| *expires_at)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.slots.clear();
    }
}
