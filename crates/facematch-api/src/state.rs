//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. The orchestrator owns the only mutable shared
//! data (the credential cache); everything else is read-only after startup.

use std::sync::Arc;

use facematch_face::{FaceComparator, FaceEncoder, DEFAULT_TOLERANCE};
use facematch_identity_client::{ConfigError, IdentityApiConfig, IdentityServiceClient, InitError};

use crate::middleware::metrics::ApiMetrics;
use crate::orchestration::Orchestrator;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Maximum face distance still considered a match.
    pub tolerance: f64,
    /// Identity service endpoints and credentials.
    pub identity: IdentityApiConfig,
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration through `lookup`. Optional values fall back to
    /// their defaults when unset or empty.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppConfigError> {
        let identity = IdentityApiConfig::from_vars(&lookup)?;

        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match optional("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppConfigError::InvalidValue("PORT".into(), e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let tolerance = match optional("FACEMATCH_TOLERANCE") {
            Some(raw) => parse_tolerance(&raw)?,
            None => DEFAULT_TOLERANCE,
        };

        Ok(Self {
            port,
            tolerance,
            identity,
        })
    }
}

fn parse_tolerance(raw: &str) -> Result<f64, AppConfigError> {
    let invalid =
        |reason: String| AppConfigError::InvalidValue("FACEMATCH_TOLERANCE".into(), reason);
    let value: f64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("must be a non-negative number, got {value}")));
    }
    Ok(value)
}

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error(transparent)]
    Identity(#[from] ConfigError),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Wire the pipeline from configuration and an encoder.
    pub fn from_config(
        config: &AppConfig,
        encoder: Arc<dyn FaceEncoder>,
    ) -> Result<Self, InitError> {
        let identity = IdentityServiceClient::new(config.identity.clone())?;
        Ok(Self::new(identity, FaceComparator::new(encoder, config.tolerance)))
    }

    /// Build state from already constructed parts.
    pub fn new(identity: IdentityServiceClient, comparator: FaceComparator) -> Self {
        Self {
            orchestrator: Orchestrator::new(identity, comparator),
            metrics: ApiMetrics::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TOKEN_URL", "https://idp.example/oauth/token"),
            ("TOKEN_AUTH_HEADER", "Basic abc"),
            ("TOKEN_USERNAME", "svc"),
            ("TOKEN_PASSWORD", "pw"),
            ("TOKEN_SCOPE", "identity"),
            ("IMAGE_CONSULT_URL", "https://photos.example/lookup"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, AppConfigError> {
        AppConfig::from_vars(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.identity.timeout_secs, 30);
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = base_vars();
        vars.insert("PORT", "9100");
        vars.insert("FACEMATCH_TOLERANCE", "0.45");
        let config = load(&vars).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.tolerance, 0.45);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut vars = base_vars();
        vars.insert("PORT", "eighty");
        assert!(matches!(load(&vars), Err(AppConfigError::InvalidValue(ref k, _)) if k == "PORT"));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let mut vars = base_vars();
        vars.insert("FACEMATCH_TOLERANCE", "-0.1");
        assert!(load(&vars).is_err());
        vars.insert("FACEMATCH_TOLERANCE", "NaN");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn missing_identity_vars_surface() {
        let mut vars = base_vars();
        vars.remove("TOKEN_URL");
        vars.remove("TOKEN_SCOPE");
        let msg = load(&vars).unwrap_err().to_string();
        assert!(msg.contains("TOKEN_URL") && msg.contains("TOKEN_SCOPE"), "got: {msg}");
    }
}
