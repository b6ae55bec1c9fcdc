//! Integration Tests for the Cache Facade
//!
//! Expiry and priming behavior observed through the public API only, on a
//! paused tokio clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stratacache::{memoize, Cache, CacheConfig, CacheError, Registry};
use tokio::time::sleep;

// == Helper Functions ==

fn config(strategy: &str) -> CacheConfig {
    CacheConfig::default()
        .with_strategy(strategy)
        .with_max_age(Duration::from_secs(10))
        .with_clean_interval(Duration::from_secs(1))
}

fn cache(strategy: &str) -> Cache<String> {
    Cache::init(&config(strategy)).unwrap()
}

// == Expiry Tests ==

#[tokio::test(start_paused = true)]
async fn test_entry_lives_until_its_bucket_fires() {
    let cache = cache("expiring");
    cache
        .put_with_ttl_sync("k", "v".into(), Duration::from_millis(2_500))
        .unwrap();

    sleep(Duration::from_millis(2_400)).await;
    assert_eq!(cache.get_sync("k").unwrap(), Some("v".into()));

    sleep(Duration::from_millis(1_700)).await;
    assert_eq!(cache.get_sync("k").unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_reads_do_not_extend_lifetime() {
    let cache = cache("expiring");
    cache
        .put_with_ttl_sync("k", "v".into(), Duration::from_secs(2))
        .unwrap();

    for _ in 0..5 {
        sleep(Duration::from_millis(500)).await;
        cache.get_sync("k").unwrap();
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(cache.get_sync("k").unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_reput_moves_key_to_new_bucket() {
    let cache = cache("expiring");
    cache
        .put_with_ttl_sync("k", "old".into(), Duration::from_secs(1))
        .unwrap();
    cache
        .put_with_ttl_sync("k", "new".into(), Duration::from_secs(5))
        .unwrap();

    sleep(Duration::from_secs(3)).await;
    assert_eq!(cache.get_sync("k").unwrap(), Some("new".into()));

    sleep(Duration::from_secs(4)).await;
    assert_eq!(cache.get_sync("k").unwrap(), None);
    assert_eq!(cache.stats().map(|s| s.expired), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_removed_key_is_not_expired_later() {
    let cache = cache("expiring");
    cache
        .put_with_ttl_sync("k", "v".into(), Duration::from_secs(1))
        .unwrap();
    assert_eq!(cache.remove_sync("k").unwrap(), Some("v".into()));

    sleep(Duration::from_secs(3)).await;

    let stats = cache.stats().unwrap();
    assert_eq!(stats.expired, 0);
    assert_eq!(stats.buckets, 0);
}

#[tokio::test(start_paused = true)]
async fn test_soft_cap_evicts_soonest_expiring() {
    let cache: Cache<String> = Cache::init(&config("expiring").with_max_length(2)).unwrap();
    cache
        .put_with_ttl_sync("late", "1".into(), Duration::from_secs(9))
        .unwrap();
    cache
        .put_with_ttl_sync("soon", "2".into(), Duration::from_secs(2))
        .unwrap();
    cache
        .put_with_ttl_sync("mid", "3".into(), Duration::from_secs(5))
        .unwrap();

    assert_eq!(cache.len().unwrap(), 2);
    assert_eq!(cache.get_sync("soon").unwrap(), None);
    assert_eq!(cache.stats().map(|s| s.evicted), Some(1));
}

// == Priming Tests ==

#[tokio::test(start_paused = true)]
async fn test_prime_all_with_spawned_fills() {
    let cache = cache("primed-expiring");
    let primer = cache.primer().unwrap();

    let wait = primer
        .prime_all(vec![("a", 1u64), ("b", 2), ("c", 3)], |(key, delay), done| {
            let key = key.to_string();
            tokio::spawn(async move {
                sleep(Duration::from_millis(delay * 100)).await;
                done.complete(Some(key.repeat(2)));
            });
        })
        .unwrap();

    wait.await.unwrap();
    assert_eq!(cache.len().unwrap(), 3);
    assert_eq!(cache.get_sync("c").unwrap(), Some("cc".into()));

    sleep(Duration::from_secs(12)).await;
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_prime_callback_fires_once() {
    let cache = cache("primed");
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    cache
        .primer()
        .unwrap()
        .prime(
            ["x", "y"],
            |_, done| done.complete(None),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(cache.is_empty().unwrap());
}

#[tokio::test]
async fn test_prime_all_abandoned() {
    let cache = cache("primed");

    let wait = cache
        .primer()
        .unwrap()
        .prime_all(["lost"], |_, done| drop(done))
        .unwrap();

    assert_eq!(wait.await, Err(CacheError::PrimeAbandoned));
}

// == Registry and Memoize Tests ==

#[test]
fn test_unknown_names_fail_before_construction() {
    let result: Result<Cache<String>, _> = Cache::init(&config("nope"));
    assert_eq!(result.err().map(|e| e.code()), Some("CACHE_UNKNOWN_STRATEGY"));

    let registry: Registry<String> = Registry::standard();
    assert!(registry.engine("memory").is_ok());
}

#[test]
fn test_expiring_requires_runtime() {
    let result: Result<Cache<String>, _> = Cache::init(&config("expiring"));

    assert_eq!(result.err(), Some(CacheError::RuntimeUnavailable));
}

#[tokio::test]
async fn test_memoize_through_public_api() {
    let calls = AtomicUsize::new(0);
    let greet = memoize(
        |args: &[&str]| {
            calls.fetch_add(1, Ordering::SeqCst);
            format!("hello {}", args.join(" "))
        },
        None,
    )
    .unwrap();

    assert_eq!(greet.call(&["ada"]).unwrap(), "hello ada");
    assert_eq!(greet.call(&["ada"]).unwrap(), "hello ada");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
