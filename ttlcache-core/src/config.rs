use std::time::Duration;

/// Environment variable read by [`CacheConfig::from_env`] (whole seconds).
pub const CLEANUP_INTERVAL_ENV: &str = "TTLCACHE_CLEANUP_INTERVAL";

/// Default pause between sweep passes.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for a cache's background sweep.
///
/// The interval is fixed once the cache is built; there is no way to retune a
/// running sweeper.
///
/// # Example
///
/// ```rust
/// use ttlcache_core::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_cleanup_interval(Duration::from_secs(30));
/// assert_eq!(config.cleanup_interval, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between sweep passes (default: 60 seconds)
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cleanup interval
    ///
    /// A zero interval is accepted here but rejected when the cache is built.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Creates a configuration from the environment.
    ///
    /// Reads `TTLCACHE_CLEANUP_INTERVAL` as whole seconds. A missing variable
    /// yields the default; an unparsable or zero value logs a warning and
    /// yields the default.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(CLEANUP_INTERVAL_ENV).ok().as_deref())
    }

    fn from_env_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Self::default().with_cleanup_interval(Duration::from_secs(secs)),
            Ok(_) => {
                tracing::warn!(
                    "{} must be greater than zero, using default of {}s",
                    CLEANUP_INTERVAL_ENV,
                    DEFAULT_CLEANUP_INTERVAL.as_secs()
                );
                Self::default()
            }
            Err(err) => {
                tracing::warn!(
                    value = raw,
                    error = %err,
                    "invalid {}, using default of {}s",
                    CLEANUP_INTERVAL_ENV,
                    DEFAULT_CLEANUP_INTERVAL.as_secs()
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_custom_cleanup_interval() {
        let config = CacheConfig::new().with_cleanup_interval(Duration::from_millis(250));
        assert_eq!(config.cleanup_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_env_value_missing_uses_default() {
        assert_eq!(CacheConfig::from_env_value(None), CacheConfig::default());
    }

    #[test]
    fn test_env_value_parsed_as_seconds() {
        let config = CacheConfig::from_env_value(Some(" 15 "));
        assert_eq!(config.cleanup_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_env_value_invalid_falls_back() {
        assert_eq!(CacheConfig::from_env_value(Some("soon")), CacheConfig::default());
        assert_eq!(CacheConfig::from_env_value(Some("-3")), CacheConfig::default());
        assert_eq!(CacheConfig::from_env_value(Some("0")), CacheConfig::default());
    }
}
