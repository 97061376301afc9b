//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the versioning and storage invariants of the
//! cache manager over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{CacheBackend, CacheManager, CacheOptions, TimedStore};

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn manager() -> CacheManager<String> {
    CacheManager::new(CacheOptions::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Versions count every set and delete per key, and only those.
    #[test]
    fn prop_version_counts_writes_and_invalidations(
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let cache = manager();
        let mut expected: HashMap<String, u64> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    prop_assert!(cache.set_cache(&key, value, None));
                    *expected.entry(key).or_default() += 1;
                }
                CacheOp::Get { key } => {
                    cache.get_cache(&key);
                }
                CacheOp::Delete { key } => {
                    cache.delete_cache(&key);
                    *expected.entry(key).or_default() += 1;
                }
            }
        }

        let actual: HashMap<String, u64> = cache
            .all_metadata()
            .into_iter()
            .map(|(key, record)| (key, record.version))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    // The cache mirrors a plain map of the last write per key.
    #[test]
    fn prop_cache_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = manager();
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set_cache(&key, value.clone(), None);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let hit = cache.get_cache(&key).map(|hit| hit.data);
                    prop_assert_eq!(hit.as_ref(), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    let removed = cache.delete_cache(&key);
                    prop_assert_eq!(removed, usize::from(model.remove(&key).is_some()));
                }
            }
        }

        prop_assert_eq!(cache.stats().total_entries, model.len());
    }

    // Hits and misses account for every get.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let store: TimedStore<String> = TimedStore::new(300);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(&key, value, None).unwrap();
                }
                CacheOp::Get { key } => match store.get(&key).unwrap() {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Delete { key } => {
                    store.delete(&key).unwrap();
                }
            }
        }

        let stats = store.stats().unwrap();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }

    // A set is immediately visible with a version one above the previous.
    #[test]
    fn prop_set_then_get(
        key in key_strategy(),
        prior_writes in 0usize..5,
        value in value_strategy()
    ) {
        let cache = manager();
        for _ in 0..prior_writes {
            cache.delete_cache(&key);
        }

        cache.set_cache(&key, value.clone(), None);

        let hit = cache.get_cache(&key).unwrap();
        prop_assert_eq!(hit.data, value);
        prop_assert_eq!(hit.metadata.version, prior_writes as u64 + 1);
    }
}
