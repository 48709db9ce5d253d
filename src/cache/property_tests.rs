//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine's invariants over random operation
//! sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, ManualClock};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

/// A single cache operation
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String, ttl: i64 },
    Get { key: String },
    Delete { key: String },
    Increment { key: String, delta: i64 },
    HSet { key: String, field: String },
    RPush { key: String, value: String },
    SAdd { key: String, member: String },
    Advance { secs: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy(), -1i64..3)
            .prop_map(|(key, value, ttl)| CacheOp::Set { key, value, ttl }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
        (key_strategy(), -2i64..10).prop_map(|(key, delta)| CacheOp::Increment { key, delta }),
        (key_strategy(), key_strategy()).prop_map(|(key, field)| CacheOp::HSet { key, field }),
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::RPush { key, value }),
        (key_strategy(), value_strategy()).prop_map(|(key, member)| CacheOp::SAdd { key, member }),
        (0u64..3).prop_map(|secs| CacheOp::Advance { secs }),
    ]
}

/// Applies `op`. Fails the case on an unexpected error or a write that
/// left nothing behind. Reads here must not move the hit/miss counters.
fn apply(cache: &Cache, clock: &ManualClock, op: CacheOp) -> Result<(), TestCaseError> {
    match op {
        CacheOp::Set { key, value, ttl } => {
            cache.set_with_ttl(&key, value, ttl).unwrap();
        }
        CacheOp::Get { key } => {
            cache.get(&key);
        }
        CacheOp::Delete { key } => {
            cache.delete(&[key]);
        }
        CacheOp::Increment { key, delta } => match cache.increment(&key, delta) {
            Ok(_) => prop_assert!(
                delta >= 0 && cache.exists(&key),
                "bad increment of {}",
                delta
            ),
            Err(CacheError::InvalidArgument(_)) | Err(CacheError::TypeMismatch { .. }) => {}
            Err(err) => prop_assert!(false, "increment failed with {:?}", err),
        },
        CacheOp::HSet { key, field } => {
            if let Err(err) = cache.hset(&key, &field, "v") {
                prop_assert!(is_mismatch(&err), "hset failed with {:?}", err);
            } else {
                prop_assert!(cache.exists(&key), "hset key '{}' missing", key);
            }
        }
        CacheOp::RPush { key, value } => {
            if let Err(err) = cache.rpush(&key, value) {
                prop_assert!(is_mismatch(&err), "rpush failed with {:?}", err);
            } else {
                prop_assert!(cache.exists(&key), "rpush key '{}' missing", key);
            }
        }
        CacheOp::SAdd { key, member } => {
            if let Err(err) = cache.sadd(&key, &[member.as_str()]) {
                prop_assert!(is_mismatch(&err), "sadd failed with {:?}", err);
            } else {
                prop_assert!(cache.exists(&key), "sadd key '{}' missing", key);
            }
        }
        CacheOp::Advance { secs } => clock.advance(Duration::from_secs(secs)),
    }
    Ok(())
}

fn is_mismatch(err: &CacheError) -> bool {
    matches!(err, CacheError::TypeMismatch { .. })
}

fn managed_cache(capacity: usize) -> (Cache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    (Cache::with_clock(capacity, clock.clone()), clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any operation sequence, the entry count never exceeds capacity.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let (cache, clock) = managed_cache(capacity);

        for op in ops {
            apply(&cache, &clock, op)?;
            prop_assert!(
                cache.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                cache.len(),
                capacity
            );
        }
    }

    // Hits and misses count exactly the scalar lookups that found or missed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (cache, clock) = managed_cache(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                other => apply(&cache, &clock, other)?,
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, cache.len(), "Total entries mismatch");
    }

    // Bulk writes with nothing to add never change a full cache.
    #[test]
    fn prop_empty_bulk_writes_keep_entries(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..6),
        target in "[A-Z]{1,8}",
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let cache = Cache::new(keys.len());
        for key in &keys {
            cache.set(key, "v").unwrap();
        }
        let none: [&str; 0] = [];

        cache.hset_all(&target, Vec::<(String, String)>::new()).unwrap();
        prop_assert_eq!(cache.sadd(&target, &none).unwrap(), 0);
        prop_assert_eq!(cache.rpush_all(&target, Vec::<String>::new()).unwrap(), 0);

        prop_assert_eq!(cache.len(), keys.len());
        prop_assert_eq!(cache.stats().evictions, 0);
        for key in &keys {
            prop_assert!(cache.exists(key));
        }
    }

    // Storing without TTL then reading returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let cache = Cache::new(TEST_MAX_ENTRIES);

        cache.set(&key, value.clone()).unwrap();
        prop_assert_eq!(cache.get_string(&key), Some(value));
    }

    // Deleting twice removes once and then reports zero.
    #[test]
    fn prop_delete_idempotent(key in key_strategy(), value in value_strategy(), repeats in 1usize..5) {
        let cache = Cache::new(TEST_MAX_ENTRIES);
        cache.set(&key, value).unwrap();

        prop_assert_eq!(cache.delete(&[key.as_str()]), 1);
        for _ in 0..repeats {
            prop_assert_eq!(cache.delete(&[key.as_str()]), 0);
        }
        prop_assert!(cache.get(&key).is_none());
    }

    // Overwriting returns the latest value and keeps a single entry.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let cache = Cache::new(TEST_MAX_ENTRIES);

        cache.set(&key, value1).unwrap();
        cache.set(&key, value2.clone()).unwrap();

        prop_assert_eq!(cache.get_string(&key), Some(value2));
        prop_assert_eq!(cache.len(), 1);
    }

    // Increment and decrement by the same magnitudes net to zero.
    #[test]
    fn prop_counter_balance(deltas in prop::collection::vec(0i64..1_000, 1..20)) {
        let cache = Cache::new(TEST_MAX_ENTRIES);

        for delta in &deltas {
            cache.increment("n", *delta).unwrap();
        }
        let total: i64 = deltas.iter().sum();
        prop_assert_eq!(cache.get_string("n"), Some(total.to_string()));

        for delta in &deltas {
            cache.decrement("n", *delta).unwrap();
        }
        prop_assert_eq!(cache.get_string("n"), Some("0".to_string()));
    }

    // Any negative magnitude is rejected and leaves the key untouched.
    #[test]
    fn prop_negative_magnitude_rejected(delta in i64::MIN..0) {
        let cache = Cache::new(TEST_MAX_ENTRIES);
        cache.set("n", "10").unwrap();

        let is_invalid = matches!(cache.increment("n", delta), Err(CacheError::InvalidArgument(_)));
        prop_assert!(is_invalid);
        let is_invalid = matches!(cache.decrement("n", delta), Err(CacheError::InvalidArgument(_)));
        prop_assert!(is_invalid);
        prop_assert_eq!(cache.get_string("n"), Some("10".to_string()));
    }

    // Entries with a TTL read as absent once it has elapsed; persistent
    // entries survive.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 1i64..100,
        extra in 0u64..5
    ) {
        let (cache, clock) = managed_cache(TEST_MAX_ENTRIES);
        cache.set_with_ttl(&key, value.clone(), ttl).unwrap();
        cache.set("persistent", "p").unwrap();

        clock.advance(Duration::from_millis(ttl as u64 * 1000 - 1));
        prop_assert_eq!(cache.get_string(&key), Some(value));

        clock.advance(Duration::from_millis(1 + extra * 1000));
        prop_assert!(cache.get(&key).is_none());
        prop_assert!(cache.exists("persistent"));
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Filling to capacity and adding one more evicts the first key inserted.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::hash_set("[a-z]{1,8}", 2..10),
        new_key in "[A-Z]{1,8}",
    ) {
        let unique_keys: Vec<String> = initial_keys.into_iter().collect();
        let capacity = unique_keys.len();
        let cache = Cache::new(capacity);

        for key in &unique_keys {
            cache.set(key, format!("value_{}", key)).unwrap();
        }
        prop_assert_eq!(cache.len(), capacity);

        cache.set(&new_key, "new").unwrap();

        prop_assert_eq!(cache.len(), capacity);
        prop_assert!(!cache.exists(&unique_keys[0]));
        prop_assert!(cache.exists(&new_key));
        for key in unique_keys.iter().skip(1) {
            prop_assert!(cache.exists(key), "Key '{}' should still exist", key);
        }
    }

    // A read makes a key most recently used, so the next-oldest is evicted.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{1,8}", 3..8),
        new_key in "[A-Z]{1,8}",
    ) {
        let unique_keys: Vec<String> = keys.into_iter().collect();
        let cache = Cache::new(unique_keys.len());

        for key in &unique_keys {
            cache.set(key, "v").unwrap();
        }
        cache.get(&unique_keys[0]);
        cache.set(&new_key, "new").unwrap();

        prop_assert!(cache.exists(&unique_keys[0]));
        prop_assert!(!cache.exists(&unique_keys[1]));
        prop_assert!(cache.exists(&new_key));
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent writers never push the cache past capacity and every read
    // sees a value some writer actually stored.
    #[test]
    fn prop_concurrent_operation_correctness(
        writes in prop::collection::vec((key_strategy(), value_strategy()), 10..60)
    ) {
        let cache = Cache::new(8);
        let written: HashSet<String> = writes.iter().map(|(_, v)| v.clone()).collect();
        let per_key: HashMap<String, usize> = writes.iter().fold(HashMap::new(), |mut acc, (k, _)| {
            *acc.entry(k.clone()).or_insert(0) += 1;
            acc
        });

        let handles: Vec<_> = writes
            .chunks(10)
            .map(|chunk| {
                let cache = cache.clone();
                let chunk = chunk.to_vec();
                std::thread::spawn(move || {
                    let mut observed = Vec::new();
                    for (key, value) in chunk {
                        cache.set(&key, value).unwrap();
                        if let Some(read) = cache.get_string(&key) {
                            observed.push(read);
                        }
                    }
                    observed
                })
            })
            .collect();

        for handle in handles {
            let observed = handle.join().expect("writer should not panic");
            for read in observed {
                prop_assert!(written.contains(&read), "Read value '{}' was never written", read);
            }
        }

        prop_assert!(cache.len() <= 8);
        prop_assert!(cache.len() <= per_key.len());
    }
}
