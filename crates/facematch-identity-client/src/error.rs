//! Identity service client error types.
//!
//! Each outbound call has its own error enum, classified where the failure
//! happens. Timeouts are always a distinct variant so callers can tell
//! "try again" apart from "this will never work".

/// Maximum number of response-body bytes kept in an error for diagnostics.
pub(crate) const BODY_EXCERPT_LIMIT: usize = 256;

/// Errors from the credential exchange.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token endpoint did not answer within the request timeout.
    #[error("timed out after {timeout_secs}s requesting access token from {endpoint}")]
    Timeout { endpoint: String, timeout_secs: u64 },
    /// Transport failure or non-2xx response from the token endpoint.
    #[error("token endpoint {endpoint} failed: {reason}")]
    Upstream {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },
    /// 2xx response without a usable `access_token`.
    #[error("token endpoint {endpoint} returned a malformed response: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl AuthError {
    /// Whether the failure may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Upstream { status, .. } => status.map_or(true, |s| s >= 500),
            Self::MalformedResponse { .. } => false,
        }
    }
}

/// Errors from the identity-photo lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No photo is on file for the identity number. A legitimate negative
    /// outcome: no comparison can be performed.
    #[error("no photo on file for identity number {identity}")]
    NotFound {
        /// Masked identity number.
        identity: String,
    },
    /// The lookup endpoint did not answer within the request timeout.
    #[error("timed out after {timeout_secs}s fetching identity photo from {endpoint}")]
    Timeout { endpoint: String, timeout_secs: u64 },
    /// Transport failure or non-2xx, non-404 response.
    #[error("photo lookup {endpoint} failed: {reason}")]
    Upstream {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },
    /// 2xx response without a decodable image field.
    #[error("photo lookup {endpoint} returned a malformed response: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

impl LookupError {
    /// Whether the failure may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Upstream { status, .. } => status.map_or(true, |s| s >= 500),
            Self::NotFound { .. } | Self::MalformedResponse { .. } => false,
        }
    }
}

/// Errors building the client.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Read at most [`BODY_EXCERPT_LIMIT`] bytes of a response body as text.
pub(crate) async fn body_excerpt(resp: reqwest::Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body;
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_transient() {
        let auth = AuthError::Timeout {
            endpoint: "t".into(),
            timeout_secs: 30,
        };
        assert!(auth.is_transient());
        let lookup = LookupError::Timeout {
            endpoint: "l".into(),
            timeout_secs: 30,
        };
        assert!(lookup.is_transient());
    }

    #[test]
    fn not_found_and_client_errors_are_permanent() {
        assert!(!LookupError::NotFound {
            identity: "123***09".into()
        }
        .is_transient());
        assert!(!LookupError::Upstream {
            endpoint: "l".into(),
            status: Some(401),
            reason: "unauthorized".into(),
        }
        .is_transient());
        assert!(LookupError::Upstream {
            endpoint: "l".into(),
            status: Some(503),
            reason: "unavailable".into(),
        }
        .is_transient());
        assert!(!AuthError::MalformedResponse {
            endpoint: "t".into(),
            reason: "no access_token".into(),
        }
        .is_transient());
    }

    #[test]
    fn display_messages_carry_context() {
        let err = AuthError::Timeout {
            endpoint: "https://auth.example.com/token".into(),
            timeout_secs: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("30s") && msg.contains("auth.example.com"), "got: {msg}");

        let err = LookupError::NotFound {
            identity: "123***09".into(),
        };
        assert!(err.to_string().contains("123***09"));
    }
}
