//! # Credential Exchange
//!
//! Resource-owner password grant against the configured token endpoint.
//!
//! | Method | Body | Response |
//! |--------|------|----------|
//! | POST | form: `username`, `password`, `grant_type=password`, `scope` | JSON with `access_token` |
//!
//! The fixed `Authorization` header (client credentials) is sent with every
//! exchange. The issuer's own `expires_in` is ignored; the cache applies its
//! own conservative lifetime.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::config::{ConfigError, IdentityApiConfig};
use crate::error::{body_excerpt, AuthError};

/// OAuth grant type used for the exchange.
const GRANT_TYPE: &str = "password";

/// Token endpoint response. Only `access_token` is consumed.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the token endpoint.
#[derive(Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    token_url: Url,
    auth_header: HeaderValue,
    username: String,
    password: Zeroizing<String>,
    scope: String,
    timeout: Duration,
}

impl std::fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClient")
            .field("token_url", &self.token_url)
            .field("username", &self.username)
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TokenClient {
    pub(crate) fn new(
        http: reqwest::Client,
        config: &IdentityApiConfig,
    ) -> Result<Self, ConfigError> {
        let mut auth_header = HeaderValue::from_str(config.token_auth_header.as_str())
            .map_err(|_| ConfigError::InvalidAuthHeader)?;
        auth_header.set_sensitive(true);

        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            auth_header,
            username: config.username.clone(),
            password: config.password.clone(),
            scope: config.scope.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Perform one credential exchange and return the raw access token.
    ///
    /// Calls `POST {token_url}` with a form-encoded body. No retry.
    pub async fn exchange(&self) -> Result<Zeroizing<String>, AuthError> {
        let endpoint = self.token_url.as_str();
        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", GRANT_TYPE),
            ("scope", self.scope.as_str()),
        ];

        let resp = self
            .http
            .post(self.token_url.clone())
            .header(AUTHORIZATION, self.auth_header.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = body_excerpt(resp).await;
            tracing::warn!(%status, "token endpoint rejected credential exchange");
            return Err(AuthError::Upstream {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        let parsed: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: format!("response is not valid JSON: {e}"),
            })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(Zeroizing::new(token)),
            _ => Err(AuthError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: "access_token missing from response".into(),
            }),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> AuthError {
        if e.is_timeout() {
            AuthError::Timeout {
                endpoint: self.token_url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            AuthError::Upstream {
                endpoint: self.token_url.to_string(),
                status: None,
                reason: e.to_string(),
            }
        }
    }
}
