//! Identity service client configuration.
//!
//! All endpoint URLs and exchange credentials are required. Loading fails
//! fast and names every missing variable at once, so a misconfigured
//! deployment is fixed in one pass.

use std::collections::HashMap;

use url::Url;
use zeroize::Zeroizing;

/// Default timeout for both outbound calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the token issuer and photo-lookup service.
///
/// Custom `Debug` implementation redacts the authorization header and
/// password to prevent credential leakage in log output.
#[derive(Clone)]
pub struct IdentityApiConfig {
    /// Token endpoint for the credential exchange.
    pub token_url: Url,
    /// Fixed `Authorization` header value sent with the exchange
    /// (typically `Basic <client credentials>`).
    pub token_auth_header: Zeroizing<String>,
    /// Exchange username.
    pub username: String,
    /// Exchange password.
    pub password: Zeroizing<String>,
    /// Exchange scope.
    pub scope: String,
    /// Photo-lookup endpoint.
    pub photo_lookup_url: Url,
    /// Request timeout in seconds, applied to each outbound call.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IdentityApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityApiConfig")
            .field("token_url", &self.token_url)
            .field("token_auth_header", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("photo_lookup_url", &self.photo_lookup_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl IdentityApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TOKEN_URL` (required)
    /// - `TOKEN_AUTH_HEADER` (required)
    /// - `TOKEN_USERNAME` (required)
    /// - `TOKEN_PASSWORD` (required)
    /// - `TOKEN_SCOPE` (required)
    /// - `IMAGE_CONSULT_URL` (required)
    /// - `FACEMATCH_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as missing.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        let mut missing = Vec::new();
        for name in REQUIRED_VARS {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(v) => {
                    values.insert(*name, v);
                }
                None => missing.push(*name),
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing.join(", ")));
        }

        let mut take = |name: &str| values.remove(name).unwrap_or_default();

        let token_url = parse_url("TOKEN_URL", &take("TOKEN_URL"))?;
        let photo_lookup_url = parse_url("IMAGE_CONSULT_URL", &take("IMAGE_CONSULT_URL"))?;

        let timeout_secs = match lookup("FACEMATCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue("FACEMATCH_TIMEOUT_SECS".into(), raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            token_url,
            token_auth_header: Zeroizing::new(take("TOKEN_AUTH_HEADER")),
            username: take("TOKEN_USERNAME"),
            password: Zeroizing::new(take("TOKEN_PASSWORD")),
            scope: take("TOKEN_SCOPE"),
            photo_lookup_url,
            timeout_secs,
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// The token endpoint is mounted at [`MOCK_TOKEN_PATH`] and the photo
    /// lookup at [`MOCK_LOOKUP_PATH`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base_url` cannot be parsed.
    pub fn local_mock(base_url: &str) -> Result<Self, ConfigError> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            token_url: parse_url("token_url", &format!("{base}{MOCK_TOKEN_PATH}"))?,
            token_auth_header: Zeroizing::new("Basic dGVzdDp0ZXN0".into()),
            username: "svc-facematch".into(),
            password: Zeroizing::new("test-password".into()),
            scope: "identity.read".into(),
            photo_lookup_url: parse_url("photo_lookup_url", &format!("{base}{MOCK_LOOKUP_PATH}"))?,
            timeout_secs: 5,
        })
    }
}

/// Token endpoint path used by [`IdentityApiConfig::local_mock`].
pub const MOCK_TOKEN_PATH: &str = "/oauth/token";

/// Photo-lookup path used by [`IdentityApiConfig::local_mock`].
pub const MOCK_LOOKUP_PATH: &str = "/identity/photo";

const REQUIRED_VARS: &[&str] = &[
    "TOKEN_URL",
    "TOKEN_AUTH_HEADER",
    "TOKEN_USERNAME",
    "TOKEN_PASSWORD",
    "TOKEN_SCOPE",
    "IMAGE_CONSULT_URL",
];

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    MissingVars(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
    #[error("TOKEN_AUTH_HEADER contains characters not allowed in an HTTP header")]
    InvalidAuthHeader,
}
