use anyhow::{ensure, Result};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttlcache_core::{CacheConfig, TtlCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlcache_demo=info,ttlcache_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    tracing::info!("🧪 ttlcache walkthrough");
    tracing::info!("   Cleanup interval: {:?}", config.cleanup_interval);

    let cache: TtlCache<String> = TtlCache::try_with_config(config)?;

    test_basic_operations(&cache)?;
    test_parallel_set_get(&cache).await?;
    test_sliding_expiration().await?;
    test_sweep().await?;
    test_shutdown(&cache).await?;

    tracing::info!("✅ All checks passed!");

    Ok(())
}

/// SET/GET/REMOVE round trip
fn test_basic_operations(cache: &TtlCache<String>) -> Result<()> {
    tracing::info!("Check: Basic Operations");

    let key = format!("basic-{}", uuid::Uuid::new_v4());
    ensure!(cache.get(&key).is_none(), "Unset key should miss");

    cache.set(key.clone(), "hello world".to_string(), 60)?;
    ensure!(
        cache.get(&key).as_deref() == Some("hello world"),
        "Value should match"
    );

    cache.set(key.clone(), "replaced".to_string(), 60)?;
    ensure!(
        cache.get(&key).as_deref() == Some("replaced"),
        "Overwrite should replace the value"
    );

    ensure!(cache.remove(&key).is_some(), "Key should be removed");
    ensure!(cache.get(&key).is_none(), "Key should not be found after remove");

    tracing::info!("   ✓ Basic operations work correctly");
    Ok(())
}

/// Concurrent writers and readers on distinct keys, verifying no values get mixed
async fn test_parallel_set_get(cache: &TtlCache<String>) -> Result<()> {
    let num_operations = 500;
    tracing::info!("Check: Parallel SET/GET ({} concurrent tasks)", num_operations);

    let test_data: Vec<(String, String)> = (0..num_operations)
        .map(|i| {
            let key = format!("parallel-{}-{}", i, uuid::Uuid::new_v4());
            let value = format!("value-{}-{}", i, uuid::Uuid::new_v4());
            (key, value)
        })
        .collect();

    let start = Instant::now();
    let set_tasks: Vec<_> = test_data
        .iter()
        .cloned()
        .map(|(key, value)| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.set(key, value, 300) })
        })
        .collect();

    for result in join_all(set_tasks).await {
        result??;
    }
    tracing::info!("   SET {} keys in {:?}", num_operations, start.elapsed());

    let start = Instant::now();
    let errors = Arc::new(AtomicUsize::new(0));
    let get_tasks: Vec<_> = test_data
        .iter()
        .cloned()
        .map(|(key, expected)| {
            let cache = cache.clone();
            let errors = Arc::clone(&errors);
            tokio::spawn(async move {
                match cache.get(&key) {
                    Some(value) if value == expected => {}
                    Some(value) => {
                        tracing::error!("Value mismatch for {}: got {}", key, value);
                        errors.fetch_add(1, Ordering::Relaxed);
                    }
                    None => {
                        tracing::error!("Key not found: {}", key);
                        errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for result in join_all(get_tasks).await {
        result?;
    }
    tracing::info!("   GET {} keys in {:?}", num_operations, start.elapsed());

    let error_count = errors.load(Ordering::Relaxed);
    ensure!(error_count == 0, "{} values failed verification", error_count);

    for (key, _) in &test_data {
        let _ = cache.remove(key);
    }

    tracing::info!("   ✓ All {} values verified correctly", num_operations);
    Ok(())
}

/// Reads keep an entry alive past its TTL; an untouched one expires
async fn test_sliding_expiration() -> Result<()> {
    tracing::info!("Check: Sliding Expiration");

    let cache: TtlCache<String> = TtlCache::try_with_config(CacheConfig::default())?;
    cache.set("kept", "alive".to_string(), 1)?;
    cache.set("ignored", "stale".to_string(), 1)?;

    tracing::info!("   Reading \"kept\" every 600ms for 2.4s...");
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(600)).await;
        ensure!(cache.get("kept").is_some(), "Refreshed key should stay live");
    }

    ensure!(cache.get("ignored").is_none(), "Untouched key should expire");

    tracing::info!("   ✓ Sliding expiration works correctly");
    Ok(())
}

/// The background sweep removes expired entries within one interval
async fn test_sweep() -> Result<()> {
    tracing::info!("Check: Background Sweep");

    let config = CacheConfig::default().with_cleanup_interval(Duration::from_millis(250));
    let cache: TtlCache<String> = TtlCache::try_with_config(config)?;

    cache.set("x", "1".to_string(), 1)?;
    cache.set("y", "z".to_string(), 1)?;
    cache.set("z", "3".to_string(), 1)?;
    ensure!(cache.count() == 3, "Expected 3 entries");

    tokio::time::sleep(Duration::from_millis(500)).await;
    ensure!(cache.get("y").is_some(), "\"y\" should still be live");

    tokio::time::sleep(Duration::from_millis(800)).await;
    ensure!(
        cache.count() == 1 && cache.contains_key("y"),
        "Only \"y\" should remain, found {:?}",
        cache.keys()
    );

    tokio::time::sleep(Duration::from_millis(1000)).await;
    ensure!(cache.count() == 0, "Every entry should have been swept");

    tracing::info!("   ✓ Background sweep works correctly");
    Ok(())
}

/// Shutdown stops the sweep but the cache keeps serving
async fn test_shutdown(cache: &TtlCache<String>) -> Result<()> {
    tracing::info!("Check: Shutdown");

    cache.shutdown();
    ensure!(!cache.is_sweeper_running(), "Sweeper should be stopped");

    cache.set("after-shutdown", "still works".to_string(), 60)?;
    ensure!(
        cache.get("after-shutdown").as_deref() == Some("still works"),
        "Cache should keep serving after shutdown"
    );

    tracing::info!("   ✓ Shutdown works correctly");
    Ok(())
}
