//! # ttlcache core
//!
//! A thread-safe, in-process key/value cache where every entry carries a
//! time-to-live.
//!
//! ## Features
//!
//! - Generic over the stored value (`TtlCache<V>`), no runtime type checks
//! - Sliding expiration: every successful `get` restarts the entry's TTL
//! - Expired entries read as misses immediately and are reclaimed by a
//!   background sweep on a fixed interval
//! - Deterministic shutdown of the sweep, explicit or on drop
//!
//! ## Example
//!
//! ```rust,no_run
//! use ttlcache_core::{CacheConfig, TtlCache};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Sweep every 60 seconds (the default)
//!     let cache: TtlCache<String> = TtlCache::new();
//!
//!     // Or with a custom sweep interval
//!     let config = CacheConfig::default()
//!         .with_cleanup_interval(Duration::from_secs(5));
//!     let cache: TtlCache<String> = TtlCache::with_config(config);
//!
//!     // Store a value for 60 seconds; each read extends it by another 60
//!     cache.set("user:123", "John Doe".to_string(), 60).unwrap();
//!
//!     if let Some(name) = cache.get("user:123") {
//!         println!("User: {}", name);
//!     }
//!
//!     println!("{} entries", cache.count());
//!
//!     // Stop the sweep task (also happens when the last handle is dropped)
//!     cache.shutdown();
//! }
//! ```

mod config;
mod entry;
mod error;
mod store;
mod sweeper;

pub use config::{CacheConfig, CLEANUP_INTERVAL_ENV, DEFAULT_CLEANUP_INTERVAL};
pub use entry::{Entry, MAX_TTL};
pub use error::CacheError;
pub use store::{Cache, TtlCache};
