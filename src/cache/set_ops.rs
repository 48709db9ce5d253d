//! Set Operations

use std::collections::HashSet;

use crate::cache::{Cache, CacheStore, ValueKind};
use crate::error::Result;

impl Cache {
    /// Adds members to the set at `key`. Returns how many were new.
    pub fn sadd<M: AsRef<str>>(&self, key: &str, members: &[M]) -> Result<usize> {
        let mut store = self.lock();
        add_members(&mut store, key, members)
    }

    /// Adds members, then applies `ttl_seconds` to the set.
    ///
    /// A non-positive TTL keeps the set's current expiry.
    pub fn sadd_with_ttl<M: AsRef<str>>(
        &self,
        key: &str,
        members: &[M],
        ttl_seconds: i64,
    ) -> Result<usize> {
        let mut store = self.lock();
        let deadline = store.deadline(ttl_seconds)?;
        let added = add_members(&mut store, key, members)?;
        store.expire_at(key, deadline);
        Ok(added)
    }

    /// Removes members from the set at `key`. An emptied set is deleted.
    pub fn srem<M: AsRef<str>>(&self, key: &str, members: &[M]) -> Result<usize> {
        let mut store = self.lock();
        let Some(value) = store.get_mut(key) else {
            return Ok(0);
        };
        let set = value.as_set_mut(key)?;
        let removed = members
            .iter()
            .filter(|member| set.remove(member.as_ref()))
            .count();
        store.remove_if_empty(key);
        Ok(removed)
    }

    pub fn smembers(&self, key: &str) -> Result<HashSet<String>> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_set(key)?.clone()),
            None => Ok(HashSet::new()),
        }
    }

    pub fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_set(key)?.contains(member)),
            None => Ok(false),
        }
    }

    /// Number of members in the set at `key`.
    pub fn scard(&self, key: &str) -> Result<usize> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_set(key)?.len()),
            None => Ok(0),
        }
    }
}

/// Inserts `members`, creating the set only when there is something to add.
fn add_members<M: AsRef<str>>(
    store: &mut CacheStore,
    key: &str,
    members: &[M],
) -> Result<usize> {
    if members.is_empty() {
        if let Some(value) = store.get_mut(key) {
            value.as_set(key)?;
        }
        return Ok(0);
    }
    let set = store.get_or_create(key, ValueKind::Set)?.as_set_mut(key)?;
    Ok(members
        .iter()
        .filter(|member| set.insert(member.as_ref().to_string()))
        .count())
}
