use parking_lot::RwLock;
use std::time::Duration;
use tokio::time::Instant;

/// Longest TTL an entry accepts (~100 years).
///
/// Keeps `now + ttl` well inside what `Instant` can represent.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Expiration bookkeeping, always replaced as a pair.
#[derive(Debug, Clone, Copy)]
struct Expiry {
    ttl: Duration,
    expires_at: Instant,
}

impl Expiry {
    fn starting_now(ttl: Duration) -> Self {
        Self {
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }
}

/// A stored value with its own expiration state
///
/// The `(ttl, expires_at)` pair sits behind a lock owned by the entry, so
/// touching one entry never contends with the map or with other entries.
#[derive(Debug)]
pub struct Entry<V> {
    value: V,
    expiry: RwLock<Expiry>,
}

impl<V> Entry<V> {
    /// Creates an entry that expires `ttl` from now
    ///
    /// Callers must keep `ttl` at or below [`MAX_TTL`].
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expiry: RwLock::new(Expiry::starting_now(ttl)),
        }
    }

    /// Returns the stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry, returning the stored value
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the lifetime applied on every touch
    pub fn ttl(&self) -> Duration {
        self.expiry.read().ttl
    }

    /// Returns the instant after which the entry is stale
    pub fn expires_at(&self) -> Instant {
        self.expiry.read().expires_at
    }

    /// Stores `ttl` and restarts the clock: `expires_at = now + ttl`
    pub fn touch(&self, ttl: Duration) {
        let fresh = Expiry::starting_now(ttl);
        *self.expiry.write() = fresh;
    }

    /// Restarts the clock with the entry's current TTL
    pub fn refresh(&self) {
        let mut expiry = self.expiry.write();
        *expiry = Expiry::starting_now(expiry.ttl);
    }

    /// Returns `true` if the entry expired strictly before `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.read().expires_at < now
    }
}
