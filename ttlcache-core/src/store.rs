use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::entry::{Entry, MAX_TTL};
use crate::error::CacheError;
use crate::sweeper::Sweeper;

/// The get/set contract of a TTL cache
///
/// Lets callers depend on the behaviour rather than on [`TtlCache`] itself.
pub trait Cache<V> {
    /// Returns the value for `key` if it is present and live
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` for `ttl_seconds`
    fn set(&self, key: String, value: V, ttl_seconds: u64) -> Result<(), CacheError>;
}

/// State shared between cache handles and the sweeper
struct CacheInner<V> {
    data: DashMap<String, Entry<V>>,
}

impl<V> CacheInner<V> {
    /// Removes every entry that expired before a single `now` snapshot
    fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.data.retain(|_, entry| {
            if entry.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }
}

/// Thread-safe in-memory key/value cache with sliding TTL expiration
///
/// Every successful [`get`](TtlCache::get) pushes the entry's deadline out by
/// its own TTL again, so an entry that keeps being read never expires. Entries
/// that go unread past their TTL read as misses straight away and are removed
/// by a background sweep that runs every `cleanup_interval`.
///
/// The map is a `DashMap`: lookups take a shared shard lock and structural
/// changes an exclusive one. Refreshing an entry only takes that entry's own
/// lock.
///
/// Handles are cheap to clone and all clones share the same data. The sweep
/// task is stopped by [`shutdown`](TtlCache::shutdown) or when the last handle
/// is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use ttlcache_core::{CacheConfig, TtlCache};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let config = CacheConfig::default()
///         .with_cleanup_interval(Duration::from_secs(30));
///     let cache: TtlCache<String> = TtlCache::with_config(config);
///
///     cache.set("session:42", "alice".to_string(), 300).unwrap();
///     assert_eq!(cache.get("session:42").as_deref(), Some("alice"));
///
///     cache.shutdown();
/// }
/// ```
pub struct TtlCache<V> {
    inner: Arc<CacheInner<V>>,
    sweeper: Arc<Sweeper>,
    cleanup_interval: Duration,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sweeper: Arc::clone(&self.sweeper),
            cleanup_interval: self.cleanup_interval,
        }
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("count", &self.inner.data.len())
            .field("cleanup_interval", &self.cleanup_interval)
            .field("sweeper_running", &self.sweeper.is_running())
            .finish()
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache that sweeps every 60 seconds
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The cache needs a
    /// runtime to host its sweep task; use [`try_with_config`](Self::try_with_config)
    /// to get an error instead.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with a custom configuration
    ///
    /// # Panics
    ///
    /// Panics outside of a Tokio runtime context or if the cleanup interval is
    /// zero.
    pub fn with_config(config: CacheConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache and starts its sweep task
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidCleanupInterval`] for a zero interval
    /// - [`CacheError::RuntimeUnavailable`] outside of a Tokio runtime
    pub fn try_with_config(config: CacheConfig) -> Result<Self, CacheError> {
        let inner = Arc::new(CacheInner {
            data: DashMap::new(),
        });

        let sweeper = Sweeper::spawn(
            Arc::downgrade(&inner),
            config.cleanup_interval,
            CacheInner::sweep_expired,
        )?;

        tracing::debug!(
            cleanup_interval_ms = config.cleanup_interval.as_millis() as u64,
            "ttl cache created"
        );

        Ok(Self {
            inner,
            sweeper: Arc::new(sweeper),
            cleanup_interval: config.cleanup_interval,
        })
    }

    /// Stores a value with the given key and TTL in seconds
    ///
    /// An existing entry under `key` is replaced outright, value and TTL both.
    /// A TTL of 0 makes the entry stale from the next instant on.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TtlOutOfRange`] if the TTL exceeds
    /// [`MAX_TTL`] (~100 years).
    pub fn set(&self, key: impl Into<String>, value: V, ttl_seconds: u64) -> Result<(), CacheError> {
        self.set_with_ttl(key, value, Duration::from_secs(ttl_seconds))
    }

    /// Stores a value with a TTL given as a `Duration`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TtlOutOfRange`] if `ttl` exceeds [`MAX_TTL`].
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<(), CacheError> {
        if ttl > MAX_TTL {
            return Err(CacheError::TtlOutOfRange { ttl });
        }

        self.inner.data.insert(key.into(), Entry::new(value, ttl));
        Ok(())
    }

    /// Retrieves a value by key, extending its life by its TTL
    ///
    /// Returns `None` if the key doesn't exist or has expired. An expired entry
    /// is left in place for the sweep.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.inner.data.get(key)?;

        if entry.is_expired(Instant::now()) {
            return None;
        }

        entry.refresh();
        Some(entry.value().value().clone())
    }

    /// Checks if a key exists and is not expired, without refreshing it
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .data
            .get(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }

    /// Removes a key, returning its value whether or not it had expired
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner
            .data
            .remove(key)
            .map(|(_, entry)| entry.into_value())
    }

    /// Removes every entry, returning how many were present
    ///
    /// The count may be off in the presence of concurrent writers.
    pub fn clear(&self) -> usize {
        let count = self.inner.data.len();
        self.inner.data.clear();
        count
    }

    /// Returns all keys that are not expired, without refreshing them
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.inner
            .data
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Runs one sweep pass immediately
    ///
    /// Returns the number of entries removed. The background task does the
    /// same every `cleanup_interval`.
    pub fn cleanup(&self) -> usize {
        self.inner.sweep_expired()
    }

    /// Returns the number of entries in the cache, including expired ones not yet swept
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` if the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Returns the interval between sweep passes
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Returns `true` while the background sweep task is alive
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Stops the background sweep task
    ///
    /// Happens automatically when the last handle is dropped. The cache keeps
    /// serving reads and writes afterwards; expired entries then linger until
    /// [`cleanup`](Self::cleanup) is called.
    pub fn shutdown(&self) {
        self.sweeper.stop();
        tracing::debug!("ttl cache sweeper shut down");
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Cache<V> for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        TtlCache::get(self, key)
    }

    fn set(&self, key: String, value: V, ttl_seconds: u64) -> Result<(), CacheError> {
        TtlCache::set(self, key, value, ttl_seconds)
    }
}
