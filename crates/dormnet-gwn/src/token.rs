//! Access token lifecycle.
//!
//! Tokens come from the controller's `token` endpoint and stay valid for
//! about an hour. [`TokenCache`] is the shared in-process slot: the client
//! consults it before every call and refills it when the cached token is
//! missing, expired, or was rejected by the controller.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Safety margin subtracted from the advertised lifetime, in seconds.
/// Refreshing slightly early avoids racing the controller-side expiry.
pub const EXPIRY_MARGIN_SECS: u64 = 60;

/// Lifetime assumed when the token response carries no `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Current time as seconds since the Unix epoch.
pub(crate) fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current time as milliseconds since the Unix epoch, for signing.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// A bearer token together with its validity window.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    /// Unix seconds when the token was obtained.
    pub issued_at: u64,
    /// Unix seconds past which the token must not be reused.
    pub expires_at: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Build a token from the controller's advertised lifetime, applying the
    /// early-refresh margin.
    pub fn with_ttl(token: String, ttl_secs: u64) -> Self {
        let issued_at = now_unix();
        let usable = ttl_secs.saturating_sub(EXPIRY_MARGIN_SECS);
        Self {
            token,
            issued_at,
            expires_at: issued_at + usable,
        }
    }

    /// Whether the token is past its (margin-adjusted) validity window.
    pub const fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Shared slot holding the current access token.
///
/// The lock is only held for the copy in or out, never across an await.
/// Two tasks refreshing concurrently just means two token requests; the
/// controller tolerates that and the later store wins.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token, if one is present and still usable.
    pub fn current(&self) -> Option<AccessToken> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|t| !t.is_expired(now_unix()))
            .cloned()
    }

    /// Replace the cached token.
    pub fn store(&self, token: AccessToken) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token);
    }

    /// Drop the cached token so the next call re-authenticates.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn with_ttl_applies_margin() {
        let token = AccessToken::with_ttl("tok".into(), 3600);
        assert_eq!(token.expires_at - token.issued_at, 3600 - EXPIRY_MARGIN_SECS);
    }

    #[test]
    fn short_ttl_saturates_to_immediate_expiry() {
        let token = AccessToken::with_ttl("tok".into(), 30);
        assert_eq!(token.expires_at, token.issued_at);
        assert!(token.is_expired(now_unix()));
    }

    #[test]
    fn cache_returns_stored_token() {
        let cache = TokenCache::new();
        assert!(cache.current().is_none());

        cache.store(AccessToken::with_ttl("tok-a".into(), 3600));
        assert_eq!(cache.current().unwrap().token, "tok-a");
    }

    #[test]
    fn cache_skips_expired_token() {
        let cache = TokenCache::new();
        cache.store(AccessToken {
            token: "stale".into(),
            issued_at: 0,
            expires_at: 1,
        });
        assert!(cache.current().is_none());
    }

    #[test]
    fn invalidate_clears_slot() {
        let cache = TokenCache::new();
        cache.store(AccessToken::with_ttl("tok".into(), 3600));
        cache.invalidate();
        assert!(cache.current().is_none());
    }

    #[test]
    fn debug_output_redacts_token() {
        let token = AccessToken::with_ttl("tok-secret".into(), 3600);
        let debug = format!("{token:?}");
        assert!(!debug.contains("tok-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
