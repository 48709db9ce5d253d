//! Cache Value Module
//!
//! Tagged union of everything an entry can hold.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Value Kind ==
/// Discriminant of a [`CacheValue`], used in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Hash,
    List,
    Set,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Hash => "hash",
            ValueKind::List => "list",
            ValueKind::Set => "set",
        };
        f.write_str(name)
    }
}

// == Cache Value ==
/// A stored value.
///
/// Scalars are kept as strings; numeric operations parse them as `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CacheValue {
    String(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
    Set(HashSet<String>),
}

impl CacheValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            CacheValue::String(_) => ValueKind::String,
            CacheValue::Hash(_) => ValueKind::Hash,
            CacheValue::List(_) => ValueKind::List,
            CacheValue::Set(_) => ValueKind::Set,
        }
    }

    /// Creates an empty value of the given kind.
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => CacheValue::String(String::new()),
            ValueKind::Hash => CacheValue::Hash(HashMap::new()),
            ValueKind::List => CacheValue::List(VecDeque::new()),
            ValueKind::Set => CacheValue::Set(HashSet::new()),
        }
    }

    /// Returns the scalar as a string slice, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for containers with no elements. Scalars are never empty.
    pub fn is_empty_container(&self) -> bool {
        match self {
            CacheValue::String(_) => false,
            CacheValue::Hash(map) => map.is_empty(),
            CacheValue::List(list) => list.is_empty(),
            CacheValue::Set(set) => set.is_empty(),
        }
    }

    /// Approximate payload size in bytes, used for the scalar size limit.
    pub fn byte_size(&self) -> usize {
        match self {
            CacheValue::String(s) => s.len(),
            CacheValue::Hash(map) => map.iter().map(|(k, v)| k.len() + v.len()).sum(),
            CacheValue::List(list) => list.iter().map(String::len).sum(),
            CacheValue::Set(set) => set.iter().map(String::len).sum(),
        }
    }

    // == Typed Views ==
    // `key` only feeds the error message.

    pub fn as_hash(&self, key: &str) -> Result<&HashMap<String, String>> {
        match self {
            CacheValue::Hash(map) => Ok(map),
            other => Err(other.mismatch(key, ValueKind::Hash)),
        }
    }

    pub fn as_hash_mut(&mut self, key: &str) -> Result<&mut HashMap<String, String>> {
        match self {
            CacheValue::Hash(map) => Ok(map),
            other => Err(other.mismatch(key, ValueKind::Hash)),
        }
    }

    pub fn as_list(&self, key: &str) -> Result<&VecDeque<String>> {
        match self {
            CacheValue::List(list) => Ok(list),
            other => Err(other.mismatch(key, ValueKind::List)),
        }
    }

    pub fn as_list_mut(&mut self, key: &str) -> Result<&mut VecDeque<String>> {
        match self {
            CacheValue::List(list) => Ok(list),
            other => Err(other.mismatch(key, ValueKind::List)),
        }
    }

    pub fn as_set(&self, key: &str) -> Result<&HashSet<String>> {
        match self {
            CacheValue::Set(set) => Ok(set),
            other => Err(other.mismatch(key, ValueKind::Set)),
        }
    }

    pub fn as_set_mut(&mut self, key: &str) -> Result<&mut HashSet<String>> {
        match self {
            CacheValue::Set(set) => Ok(set),
            other => Err(other.mismatch(key, ValueKind::Set)),
        }
    }

    /// Parses a scalar as a signed 64-bit integer.
    pub fn as_integer(&self, key: &str) -> Result<i64> {
        match self {
            CacheValue::String(s) => s.trim().parse().map_err(|_| {
                CacheError::invalid(format!("value at key '{}' is not an integer", key))
            }),
            other => Err(other.mismatch(key, ValueKind::String)),
        }
    }

    pub(crate) fn mismatch(&self, key: &str, expected: ValueKind) -> CacheError {
        CacheError::TypeMismatch {
            key: key.to_string(),
            expected,
            found: self.kind(),
        }
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::String(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::String(value.to_string())
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::String(value.to_string())
    }
}

impl From<HashMap<String, String>> for CacheValue {
    fn from(value: HashMap<String, String>) -> Self {
        CacheValue::Hash(value)
    }
}

impl From<Vec<String>> for CacheValue {
    fn from(value: Vec<String>) -> Self {
        CacheValue::List(value.into())
    }
}

impl From<HashSet<String>> for CacheValue {
    fn from(value: HashSet<String>) -> Self {
        CacheValue::Set(value)
    }
}
