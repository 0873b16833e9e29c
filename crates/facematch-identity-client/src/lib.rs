//! # facematch-identity-client -- Typed Rust client for the identity services
//!
//! Provides typed access to the two outbound dependencies of the face match
//! pipeline:
//! - **Credential exchange** against the OAuth-style token issuer, fronted
//!   by a time-bounded [`CredentialCache`]
//! - **Identity photo lookup**, returning the decoded reference image
//!
//! ## Architecture
//!
//! Both sub-clients share one `reqwest::Client` configured with the request
//! timeout. Every outbound call is attempted exactly once; failures are
//! mapped at the call site into [`AuthError`] or [`LookupError`], with
//! timeouts and "no photo on file" as distinct variants.

pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod photo;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, IdentityApiConfig};
pub use credentials::{Credential, CredentialCache, CREDENTIAL_TTL};
pub use error::{AuthError, InitError, LookupError};
pub use photo::PhotoClient;
pub use token::TokenClient;

use std::sync::Arc;
use std::time::Duration;

/// Top-level identity service client. Holds the credential cache and the
/// photo-lookup client. Cheap to clone; clones share the credential slot.
#[derive(Debug, Clone)]
pub struct IdentityServiceClient {
    credentials: CredentialCache,
    photos: PhotoClient,
}

impl IdentityServiceClient {
    /// Create a new client from configuration, using the system clock.
    pub fn new(config: IdentityApiConfig) -> Result<Self, InitError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new client whose credential cache reads time from `clock`.
    pub fn with_clock(config: IdentityApiConfig, clock: Arc<dyn Clock>) -> Result<Self, InitError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let issuer = TokenClient::new(http.clone(), &config)?;
        Ok(Self {
            credentials: CredentialCache::new(issuer, clock),
            photos: PhotoClient::new(http, config.photo_lookup_url, timeout),
        })
    }

    /// Access the credential cache.
    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Access the photo-lookup client.
    pub fn photos(&self) -> &PhotoClient {
        &self.photos
    }
}
