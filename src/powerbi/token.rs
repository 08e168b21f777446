//! In-memory access token cache.
//!
//! One slot per provider. A cached token is only handed out while
//! `now < expires_at`; past that it behaves exactly like an empty slot.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of the current time for cache validity checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Access token plus the instant after which it must not be used.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Single-slot token cache.
///
/// Racing callers that both miss will both fetch; the last `store` wins.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token if it is still valid at `now`.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.token.clone())
    }

    /// Overwrites the slot.
    pub fn store(&self, token: CachedToken) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token);
    }

    /// Current slot contents, valid or not.
    pub fn snapshot(&self) -> Option<CachedToken> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> CachedToken {
        CachedToken {
            token: "cached".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_empty_cache_has_no_token() {
        let cache = TokenCache::new();
        assert_eq!(cache.valid_token(Utc::now()), None);
        assert_eq!(cache.snapshot(), None);
    }

    #[test]
    fn test_valid_token_before_expiry() {
        let now = Utc::now();
        let cache = TokenCache::new();
        cache.store(token_expiring_at(now + Duration::minutes(1)));

        assert_eq!(cache.valid_token(now), Some("cached".to_string()));
    }

    #[test]
    fn test_token_unusable_at_and_after_expiry() {
        let now = Utc::now();
        let cache = TokenCache::new();
        cache.store(token_expiring_at(now));

        // Boundary: now == expires_at is already expired
        assert_eq!(cache.valid_token(now), None);
        assert_eq!(cache.valid_token(now + Duration::seconds(1)), None);

        // Expired tokens stay in the slot until overwritten
        assert!(cache.snapshot().is_some());
    }

    #[test]
    fn test_store_overwrites_slot() {
        let now = Utc::now();
        let cache = TokenCache::new();
        cache.store(token_expiring_at(now - Duration::minutes(5)));
        cache.store(CachedToken {
            token: "fresh".to_string(),
            expires_at: now + Duration::minutes(55),
        });

        assert_eq!(cache.valid_token(now), Some("fresh".to_string()));
    }

    #[test]
    fn test_system_clock() {
        let clock = SystemClock;
        assert!(clock.now().timestamp() > 0);
    }
}
