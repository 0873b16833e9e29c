//! # Credential Cache
//!
//! Holds the single process-wide bearer credential. A cached credential is
//! served while `now < expires_at`; otherwise one exchange is performed and
//! its token cached for [`CREDENTIAL_TTL`], a conservative margin under the
//! issuer's real token lifetime.
//!
//! ## Concurrency
//!
//! The slot is a `parking_lot::RwLock` that is never held across `.await`.
//! Concurrent callers that miss at the same time may both refresh; the last
//! writer wins. The slot is replaced as a whole under the write lock, so a
//! reader never observes a partially written credential.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::error::AuthError;
use crate::token::TokenClient;

/// Lifetime applied to every freshly exchanged credential (50 minutes).
pub const CREDENTIAL_TTL: Duration = Duration::from_secs(50 * 60);

/// A bearer credential and its validity window.
#[derive(Clone)]
pub struct Credential {
    token: Zeroizing<String>,
    issued_at: Instant,
    expires_at: Instant,
}

impl Credential {
    /// Wrap a token issued at `issued_at`, valid for `ttl`.
    pub fn new(token: Zeroizing<String>, issued_at: Instant, ttl: Duration) -> Self {
        Self {
            token,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// The raw bearer token.
    pub fn bearer(&self) -> &str {
        self.token.as_str()
    }

    /// When the credential was obtained.
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// First instant at which the credential is no longer usable.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Whether the credential may be used at `now`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Process-wide cache around the credential exchange. Cheap to clone; all
/// clones share one slot.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    issuer: TokenClient,
    slot: Arc<RwLock<Option<Credential>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CredentialCache {
    pub(crate) fn new(issuer: TokenClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer,
            slot: Arc::new(RwLock::new(None)),
            clock,
            ttl: CREDENTIAL_TTL,
        }
    }

    /// Return the cached credential if still valid, otherwise exchange for
    /// a new one and cache it.
    pub async fn acquire(&self) -> Result<Credential, AuthError> {
        let now = self.clock.now();
        let cached = self
            .slot
            .read()
            .as_ref()
            .filter(|c| c.is_valid_at(now))
            .cloned();
        if let Some(credential) = cached {
            tracing::debug!("using cached access token");
            return Ok(credential);
        }

        tracing::info!("requesting new access token");
        let token = self.issuer.exchange().await?;
        let credential = Credential::new(token, self.clock.now(), self.ttl);
        *self.slot.write() = Some(credential.clone());
        tracing::info!(ttl_secs = self.ttl.as_secs(), "access token obtained");

        Ok(credential)
    }

    /// Discard the cached credential. The next `acquire` exchanges again.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }

    /// Whether a credential usable right now is cached.
    pub fn has_valid_credential(&self) -> bool {
        let now = self.clock.now();
        self.slot.read().as_ref().is_some_and(|c| c.is_valid_at(now))
    }

    /// The lifetime applied to new credentials.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_expires_exactly_at_ttl() {
        let t0 = Instant::now();
        let c = Credential::new(Zeroizing::new("tok".into()), t0, Duration::from_secs(60));
        assert!(c.is_valid_at(t0));
        assert!(c.is_valid_at(t0 + Duration::from_secs(59)));
        assert!(!c.is_valid_at(t0 + Duration::from_secs(60)));
        assert_eq!(c.expires_at() - c.issued_at(), Duration::from_secs(60));
    }

    #[test]
    fn credential_debug_redacts_token() {
        let c = Credential::new(
            Zeroizing::new("super-secret-token".into()),
            Instant::now(),
            CREDENTIAL_TTL,
        );
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret-token"), "token leaked: {dbg}");
        assert_eq!(c.bearer(), "super-secret-token");
    }
}
