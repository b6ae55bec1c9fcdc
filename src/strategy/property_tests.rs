//! Property-Based Tests for the Strategies
//!
//! Random put/re-put/remove sequences against the bucket scheduler and the
//! expiring strategy, checking the scheduling invariants after every step.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::config::CacheConfig;
use crate::storage::{MemoryEngine, StorageEngine};
use crate::strategy::scheduler::{bucket_time, BucketTable};
use crate::strategy::{ExpiringStrategy, PrimedStrategy};

// == Test Configuration ==
const CLEAN_INTERVAL_MS: u64 = 1_000;

// == Strategies ==
/// Small key space so re-puts and removes hit scheduled keys often
fn key_strategy() -> impl Strategy<Value = String> {
    "k[0-9]{1,2}".prop_map(|s| s)
}

fn ttl_strategy() -> impl Strategy<Value = u64> {
    0u64..30_000
}

#[derive(Debug, Clone)]
enum ExpiryOp {
    Put { key: String, ttl_ms: u64 },
    Remove { key: String },
}

fn expiry_op_strategy() -> impl Strategy<Value = ExpiryOp> {
    prop_oneof![
        3 => (key_strategy(), ttl_strategy())
            .prop_map(|(key, ttl_ms)| ExpiryOp::Put { key, ttl_ms }),
        1 => key_strategy().prop_map(|key| ExpiryOp::Remove { key }),
    ]
}

/// Paused current-thread runtime: timers never fire unless the test advances.
fn paused_runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

fn expiring(config: &CacheConfig) -> ExpiringStrategy<String> {
    let strategy = ExpiringStrategy::new(Box::new(MemoryEngine::new()));
    strategy.init(config).unwrap();
    strategy
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A bucket time is on the interval grid, strictly in the future, and
    // no more than one interval past the requested expiry.
    #[test]
    fn prop_bucket_time_bounds(
        now in 0u64..10_000_000,
        ttl in 0u64..100_000,
        interval in 1u64..5_000
    ) {
        let at = bucket_time(now, ttl, interval);

        prop_assert_eq!(at % interval, 0);
        prop_assert!(at > now);
        prop_assert!(at >= now + ttl);
        prop_assert!(at < now + ttl + interval || (ttl == 0 && at <= now + interval));
    }

    // Every scheduled key sits in exactly one non-empty bucket, and the
    // number of buckets never exceeds the number of distinct bucket times.
    #[test]
    fn prop_table_invariants(ops in prop::collection::vec(expiry_op_strategy(), 1..80)) {
        let mut table = BucketTable::new();
        let mut live: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                ExpiryOp::Put { key, ttl_ms } => {
                    let at = bucket_time(0, ttl_ms, CLEAN_INTERVAL_MS);
                    table.schedule(&key, at, |_, _| None);
                    prop_assert_eq!(table.bucket_of(&key), Some(at));
                    live.insert(key);
                }
                ExpiryOp::Remove { key } => {
                    prop_assert_eq!(table.detach(&key), live.remove(&key));
                    prop_assert_eq!(table.bucket_of(&key), None);
                }
            }
            table.assert_consistent();
            prop_assert_eq!(table.len(), live.len());
        }
    }

    // Store and scheduler agree: every scheduled key has a live entry and
    // the soft bound holds after every put.
    #[test]
    fn prop_expiring_store_matches_schedule(
        ops in prop::collection::vec(expiry_op_strategy(), 1..60),
        max_length in 0usize..8
    ) {
        let rt = paused_runtime();
        let _guard = rt.enter();
        let config = CacheConfig::default()
            .with_clean_interval(Duration::from_millis(CLEAN_INTERVAL_MS))
            .with_max_length(max_length);
        let cache = expiring(&config);

        for op in ops {
            match op {
                ExpiryOp::Put { key, ttl_ms } => {
                    cache
                        .put_with_ttl_sync(&key, key.clone(), Duration::from_millis(ttl_ms))
                        .unwrap();
                }
                ExpiryOp::Remove { key } => {
                    cache.remove_sync(&key).unwrap();
                    prop_assert!(cache.bucket_of(&key).is_none());
                }
            }

            let stats = cache.stats();
            prop_assert_eq!(stats.keys, cache.len().unwrap());
            prop_assert!(stats.buckets <= stats.keys);
            if max_length > 0 {
                prop_assert!(cache.len().unwrap() <= max_length);
            }
        }
    }

    // Whatever the order of puts, every key is gone once the longest TTL
    // plus one interval has elapsed, and each key expired exactly once.
    #[test]
    fn prop_everything_expires(
        entries in prop::collection::vec((key_strategy(), ttl_strategy()), 1..40)
    ) {
        let rt = paused_runtime();
        let config = CacheConfig::default()
            .with_clean_interval(Duration::from_millis(CLEAN_INTERVAL_MS));

        let (remaining, expired, distinct) = rt.block_on(async {
            let cache = expiring(&config);
            let mut distinct = HashSet::new();
            let mut longest = 0;
            for (key, ttl_ms) in &entries {
                cache
                    .put_with_ttl_sync(key, key.clone(), Duration::from_millis(*ttl_ms))
                    .unwrap();
                distinct.insert(key.clone());
                longest = longest.max(*ttl_ms);
            }

            tokio::time::sleep(Duration::from_millis(longest + CLEAN_INTERVAL_MS + 1)).await;
            (cache.len().unwrap(), cache.stats().expired, distinct.len())
        });

        prop_assert_eq!(remaining, 0);
        prop_assert_eq!(expired, distinct as u64);
    }

    // Priming stores exactly the keys whose fill produced a value.
    #[test]
    fn prop_prime_sync_stores_some_results(
        keys in prop::collection::hash_set(key_strategy(), 0..20)
    ) {
        let cache: PrimedStrategy<String> = PrimedStrategy::new(Box::new(MemoryEngine::new()));
        cache.init(&CacheConfig::default()).unwrap();
        let keys: Vec<String> = keys.into_iter().collect();

        cache
            .prime_sync(keys.clone(), |key| (key.len() % 2 == 0).then(|| key.to_uppercase()))
            .unwrap();

        let expected = keys.iter().filter(|k| k.len() % 2 == 0).count();
        prop_assert_eq!(cache.len().unwrap(), expected);
    }
}
