//! Hash Operations
//!
//! Field-level access to hash values. An absent key reads as an empty hash
//! and is created on first write.

use std::collections::HashMap;

use crate::cache::engine::{checked_add, require_magnitude};
use crate::cache::{Cache, ValueKind};
use crate::error::{CacheError, Result};

impl Cache {
    /// Returns the value of `field` in the hash at `key`.
    pub fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_hash(key)?.get(field).cloned()),
            None => Ok(None),
        }
    }

    /// Returns every field of the hash at `key`.
    pub fn hget_all(&self, key: &str) -> Result<HashMap<String, String>> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_hash(key)?.clone()),
            None => Ok(HashMap::new()),
        }
    }

    pub fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_hash(key)?.contains_key(field)),
            None => Ok(false),
        }
    }

    pub fn hlen(&self, key: &str) -> Result<usize> {
        match self.lock().get(key) {
            Some(value) => Ok(value.as_hash(key)?.len()),
            None => Ok(0),
        }
    }

    /// Sets `field` in the hash at `key`. Returns `true` if the field is new.
    pub fn hset(&self, key: &str, field: &str, value: impl Into<String>) -> Result<bool> {
        let mut store = self.lock();
        let hash = store.get_or_create(key, ValueKind::Hash)?.as_hash_mut(key)?;
        Ok(hash.insert(field.to_string(), value.into()).is_none())
    }

    /// Sets `field` and then applies `ttl_seconds` to the whole hash.
    ///
    /// A non-positive TTL keeps the hash's current expiry.
    pub fn hset_with_ttl(
        &self,
        key: &str,
        field: &str,
        value: impl Into<String>,
        ttl_seconds: i64,
    ) -> Result<bool> {
        let mut store = self.lock();
        let deadline = store.deadline(ttl_seconds)?;
        let hash = store.get_or_create(key, ValueKind::Hash)?.as_hash_mut(key)?;
        let created = hash.insert(field.to_string(), value.into()).is_none();
        store.expire_at(key, deadline);
        Ok(created)
    }

    /// Sets several fields at once. No fields is a no-op.
    pub fn hset_all<I, F, V>(&self, key: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(f, v)| (f.into(), v.into()))
            .collect();
        let mut store = self.lock();
        if fields.is_empty() {
            if let Some(value) = store.get_mut(key) {
                value.as_hash(key)?;
            }
            return Ok(());
        }
        let hash = store.get_or_create(key, ValueKind::Hash)?.as_hash_mut(key)?;
        hash.extend(fields);
        Ok(())
    }

    /// Removes fields from the hash at `key` and returns how many existed.
    /// A hash left empty is deleted.
    pub fn hdel<F: AsRef<str>>(&self, key: &str, fields: &[F]) -> Result<usize> {
        let mut store = self.lock();
        let Some(value) = store.get_mut(key) else {
            return Ok(0);
        };
        let hash = value.as_hash_mut(key)?;
        let removed = fields
            .iter()
            .filter(|field| hash.remove(field.as_ref()).is_some())
            .count();
        store.remove_if_empty(key);
        Ok(removed)
    }

    /// Adds a non-negative `delta` to an integer field, starting from 0.
    pub fn hincrement(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.apply_field_delta(key, field, require_magnitude(delta)?)
    }

    /// Subtracts a non-negative `delta` from an integer field, starting from 0.
    pub fn hdecrement(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.apply_field_delta(key, field, -require_magnitude(delta)?)
    }

    fn apply_field_delta(&self, key: &str, field: &str, amount: i64) -> Result<i64> {
        let mut store = self.lock();
        let hash = store.get_or_create(key, ValueKind::Hash)?.as_hash_mut(key)?;
        let current = match hash.get(field) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                CacheError::invalid(format!(
                    "field '{}' of key '{}' is not an integer",
                    field, key
                ))
            }),
            None => Ok(0),
        };
        let next = current.and_then(|current| checked_add(key, current, amount));
        if let Ok(next) = next {
            hash.insert(field.to_string(), next.to_string());
        }
        // A freshly created hash stays empty when the update fails
        store.remove_if_empty(key);
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{Cache, ValueKind};
    use crate::error::CacheError;

    #[test]
    fn test_hset_and_hget() {
        let cache = Cache::new(10);

        assert!(cache.hset("user", "name", "joe").unwrap());
        assert!(!cache.hset("user", "name", "zdx").unwrap());

        assert_eq!(cache.hget("user", "name").unwrap().as_deref(), Some("zdx"));
        assert_eq!(cache.hget("user", "age").unwrap(), None);
        assert_eq!(cache.hget("nobody", "name").unwrap(), None);
        assert!(cache.hexists("user", "name").unwrap());
        assert_eq!(cache.hlen("user").unwrap(), 1);
    }

    #[test]
    fn test_hset_all_and_hget_all() {
        let cache = Cache::new(10);
        cache
            .hset_all("user", [("name", "joe"), ("city", "xi'an")])
            .unwrap();

        let all = cache.hget_all("user").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["city"], "xi'an");
        assert!(cache.hget_all("missing").unwrap().is_empty());
    }

    #[test]
    fn test_hset_all_empty_creates_nothing() {
        let cache = Cache::new(10);
        cache
            .hset_all("user", Vec::<(String, String)>::new())
            .unwrap();
        assert!(!cache.exists("user"));
    }

    #[test]
    fn test_hdel_drops_empty_hash() {
        let cache = Cache::new(10);
        cache.hset("h", "a", "1").unwrap();
        cache.hset("h", "b", "2").unwrap();

        assert_eq!(cache.hdel("h", &["a", "missing"]).unwrap(), 1);
        assert!(cache.exists("h"));
        assert_eq!(cache.hdel("h", &["b"]).unwrap(), 1);
        assert!(!cache.exists("h"));
        assert_eq!(cache.hdel("h", &["b"]).unwrap(), 0);
    }

    #[test]
    fn test_hincrement_and_hdecrement() {
        let cache = Cache::new(10);

        assert_eq!(cache.hincrement("h", "n", 4).unwrap(), 4);
        assert_eq!(cache.hdecrement("h", "n", 6).unwrap(), -2);
        assert_eq!(cache.hget("h", "n").unwrap().as_deref(), Some("-2"));
        assert!(matches!(
            cache.hincrement("h", "n", -1),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_hincrement_non_numeric_field() {
        let cache = Cache::new(10);
        cache.hset("h", "name", "joe").unwrap();

        assert!(matches!(
            cache.hincrement("h", "name", 1),
            Err(CacheError::InvalidArgument(_))
        ));
        assert_eq!(cache.hget("h", "name").unwrap().as_deref(), Some("joe"));
    }

    #[test]
    fn test_hash_ops_on_wrong_kind() {
        let cache = Cache::new(10);
        cache.set("s", "scalar").unwrap();

        let expected = CacheError::TypeMismatch {
            key: "s".to_string(),
            expected: ValueKind::Hash,
            found: ValueKind::String,
        };
        assert_eq!(cache.hset("s", "f", "v"), Err(expected.clone()));
        assert_eq!(cache.hget("s", "f"), Err(expected.clone()));
        assert_eq!(cache.hdel("s", &["f"]), Err(expected));
        assert_eq!(cache.get_string("s").as_deref(), Some("scalar"));
    }

    #[test]
    fn test_empty_hset_all_keeps_full_cache_intact() {
        let cache = Cache::new(1);
        cache.set("a", "1").unwrap();

        cache
            .hset_all("h", Vec::<(String, String)>::new())
            .unwrap();

        assert_eq!(cache.get_string("a").as_deref(), Some("1"));
        assert!(!cache.exists("h"));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_hset_with_ttl_overflow_writes_nothing() {
        let cache = Cache::new(1);
        cache.set("a", "1").unwrap();

        assert!(matches!(
            cache.hset_with_ttl("h", "f", "v", i64::MAX),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(!cache.exists("h"));
        assert_eq!(cache.get_string("a").as_deref(), Some("1"));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_hset_with_zero_ttl_keeps_expiry() {
        use crate::cache::{ManualClock, TtlStatus};
        use std::sync::Arc;
        use std::time::Duration;

        let clock = Arc::new(ManualClock::new(0));
        let cache = Cache::with_clock(10, clock.clone());

        cache.hset_with_ttl("h", "f", "v", 10).unwrap();
        cache.hset_with_ttl("h", "g", "v", 0).unwrap();
        assert_eq!(cache.ttl("h"), TtlStatus::Expires(Duration::from_secs(10)));
        assert_eq!(cache.hlen("h").unwrap(), 2);

        cache.hset_with_ttl("p", "f", "v", -1).unwrap();
        assert_eq!(cache.ttl("p"), TtlStatus::Persistent);
    }

    #[test]
    fn test_hset_with_ttl() {
        use crate::cache::{ManualClock, TtlStatus};
        use std::sync::Arc;
        use std::time::Duration;

        let clock = Arc::new(ManualClock::new(0));
        let cache = Cache::with_clock(10, clock.clone());

        cache.hset_with_ttl("h", "f", "v", 5).unwrap();
        assert_eq!(cache.ttl("h"), TtlStatus::Expires(Duration::from_secs(5)));

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.hget("h", "f").unwrap(), None);
    }
}
