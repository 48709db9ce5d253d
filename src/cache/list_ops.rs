//! List Operations
//!
//! Indices follow the usual convention: negative values count from the tail,
//! `-1` being the last element.

use crate::cache::{Cache, ValueKind};
use crate::error::{CacheError, Result};

impl Cache {
    /// Appends `value` to the list at `key`. Returns the new length.
    pub fn rpush(&self, key: &str, value: impl Into<String>) -> Result<usize> {
        let value: String = value.into();
        self.rpush_all(key, [value])
    }

    /// Appends every value in order. Returns the new length.
    pub fn rpush_all<I, V>(&self, key: &str, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let mut store = self.lock();
        if values.is_empty() {
            return match store.get_mut(key) {
                Some(value) => Ok(value.as_list(key)?.len()),
                None => Ok(0),
            };
        }
        let list = store.get_or_create(key, ValueKind::List)?.as_list_mut(key)?;
        list.extend(values);
        Ok(list.len())
    }

    /// Appends `value`, then applies `ttl_seconds` to the list.
    ///
    /// A non-positive TTL keeps the list's current expiry.
    pub fn rpush_with_ttl(
        &self,
        key: &str,
        value: impl Into<String>,
        ttl_seconds: i64,
    ) -> Result<usize> {
        let mut store = self.lock();
        let deadline = store.deadline(ttl_seconds)?;
        let list = store.get_or_create(key, ValueKind::List)?.as_list_mut(key)?;
        list.push_back(value.into());
        let len = list.len();
        store.expire_at(key, deadline);
        Ok(len)
    }

    /// Returns elements `start..=end`. Out-of-range bounds are clamped.
    pub fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<String>> {
        let mut store = self.lock();
        let Some(value) = store.get(key) else {
            return Ok(Vec::new());
        };
        let list = value.as_list(key)?;
        let len = list.len() as i64;

        let start = if start < 0 { (len + start).max(0) } else { start };
        let end = if end < 0 { len + end } else { end.min(len - 1) };
        if start > end || start >= len {
            return Ok(Vec::new());
        }

        Ok(list
            .range(start as usize..=end as usize)
            .cloned()
            .collect())
    }

    pub fn llen(&self, key: &str) -> Result<usize> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_list(key)?.len()),
            None => Ok(0),
        }
    }

    pub fn lindex(&self, key: &str, index: i64) -> Result<Option<String>> {
        let mut store = self.lock();
        let Some(value) = store.get(key) else {
            return Ok(None);
        };
        let list = value.as_list(key)?;
        Ok(resolve_index(list.len(), index).and_then(|i| list.get(i).cloned()))
    }

    /// Replaces the element at `index`.
    ///
    /// The list must exist and `index` must be in range.
    pub fn lset(&self, key: &str, index: i64, value: impl Into<String>) -> Result<()> {
        let mut store = self.lock();
        let list = store
            .get_mut(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?
            .as_list_mut(key)?;
        let slot = resolve_index(list.len(), index)
            .and_then(|i| list.get_mut(i))
            .ok_or_else(|| {
                CacheError::invalid(format!("index {} out of range for key '{}'", index, key))
            })?;
        *slot = value.into();
        Ok(())
    }

    /// Removes occurrences of `value`.
    ///
    /// `count > 0` removes up to `count` from the head, `count < 0` up to
    /// `|count|` from the tail, `0` removes all. An emptied list is deleted.
    pub fn lrem(&self, key: &str, count: i64, value: &str) -> Result<usize> {
        let mut store = self.lock();
        let Some(entry) = store.get_mut(key) else {
            return Ok(0);
        };
        let list = entry.as_list_mut(key)?;

        let limit = if count == 0 {
            usize::MAX
        } else {
            usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX)
        };
        let mut removed = 0;
        if count >= 0 {
            list.retain(|item| {
                if removed < limit && item == value {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        store.remove_if_empty(key);
        Ok(removed)
    }
}

/// Maps a possibly negative index onto `0..len`.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}
