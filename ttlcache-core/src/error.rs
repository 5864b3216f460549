//! Error types for the cache.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by cache construction and `set`.
///
/// A lookup miss is not an error; `get` reports it as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The TTL pushes the expiration past what the clock can represent
    #[error("TTL of {}s is out of range (maximum is {}s)", .ttl.as_secs(), crate::entry::MAX_TTL.as_secs())]
    TtlOutOfRange {
        /// The rejected TTL
        ttl: Duration,
    },

    /// The sweep interval was zero or too large for the clock
    #[error("cleanup interval must be greater than zero and within clock range")]
    InvalidCleanupInterval,

    /// No Tokio runtime was available to host the sweeper task
    #[error(
        "ttlcache requires a Tokio runtime; build the cache from within a \
         #[tokio::main] or #[tokio::test] context, or after entering a runtime"
    )]
    RuntimeUnavailable,
}
