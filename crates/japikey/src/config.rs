//! Verification configuration.
//!
//! Configuration is built explicitly with [`VerificationConfig::new`] and the
//! `with_*` setters, or loaded from environment variables. Every limit is a
//! field of the config value; there is no process-global state.

use crate::version::CURRENT_VERSION;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Maximum accepted token size in bytes.
///
/// Checked before any decoding so the cost of rejecting a hostile token is
/// bounded by this constant.
pub const MAX_TOKEN_BYTES: usize = 4096;

/// Default budget handed to the key resolver (10 seconds).
pub const DEFAULT_KEY_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for the key resolution budget (5 minutes).
pub const MAX_KEY_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings shared by `verify` and `should_verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationConfig {
    base_issuer: String,
    key_resolution_timeout: Duration,
    max_version: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid base issuer: {0}")]
    InvalidBaseIssuer(String),

    #[error("Invalid max version: {0}")]
    InvalidMaxVersion(String),

    #[error("Invalid key resolution timeout: {0}")]
    InvalidKeyResolutionTimeout(String),
}

impl VerificationConfig {
    /// Create a config for `base_issuer` with default limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseIssuer` if the issuer is empty or
    /// contains whitespace.
    pub fn new(base_issuer: impl Into<String>) -> Result<Self, ConfigError> {
        let base_issuer = base_issuer.into();
        if base_issuer.is_empty() {
            return Err(ConfigError::InvalidBaseIssuer(
                "base issuer must not be empty".to_string(),
            ));
        }
        if base_issuer.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidBaseIssuer(
                "base issuer must not contain whitespace".to_string(),
            ));
        }

        Ok(Self {
            base_issuer,
            key_resolution_timeout: DEFAULT_KEY_RESOLUTION_TIMEOUT,
            max_version: CURRENT_VERSION,
        })
    }

    /// Set the highest token format version to accept.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMaxVersion` for 0.
    pub fn with_max_version(mut self, max_version: u32) -> Result<Self, ConfigError> {
        if max_version == 0 {
            return Err(ConfigError::InvalidMaxVersion(
                "max version must be at least 1".to_string(),
            ));
        }
        self.max_version = max_version;
        Ok(self)
    }

    /// Set the budget handed to the key resolver.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidKeyResolutionTimeout` for zero or values
    /// above [`MAX_KEY_RESOLUTION_TIMEOUT`].
    pub fn with_key_resolution_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidKeyResolutionTimeout(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if timeout > MAX_KEY_RESOLUTION_TIMEOUT {
            return Err(ConfigError::InvalidKeyResolutionTimeout(format!(
                "timeout must not exceed {} seconds",
                MAX_KEY_RESOLUTION_TIMEOUT.as_secs()
            )));
        }
        self.key_resolution_timeout = timeout;
        Ok(self)
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See [`Self::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    ///
    /// Reads `JAPIKEY_BASE_ISSUER` (required), `JAPIKEY_MAX_VERSION` and
    /// `JAPIKEY_KEY_RESOLUTION_TIMEOUT_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing issuer or any value that fails to
    /// parse or validate.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let base_issuer = vars
            .get("JAPIKEY_BASE_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("JAPIKEY_BASE_ISSUER".to_string()))?
            .clone();

        let mut config = Self::new(base_issuer)?;

        if let Some(value) = vars.get("JAPIKEY_MAX_VERSION") {
            let max_version: u32 = value.parse().map_err(|e| {
                ConfigError::InvalidMaxVersion(format!(
                    "JAPIKEY_MAX_VERSION must be a positive integer, got '{value}': {e}"
                ))
            })?;
            config = config.with_max_version(max_version)?;
        }

        if let Some(value) = vars.get("JAPIKEY_KEY_RESOLUTION_TIMEOUT_SECONDS") {
            let seconds: u64 = value.parse().map_err(|e| {
                ConfigError::InvalidKeyResolutionTimeout(format!(
                    "JAPIKEY_KEY_RESOLUTION_TIMEOUT_SECONDS must be a positive integer, got '{value}': {e}"
                ))
            })?;
            config = config.with_key_resolution_timeout(Duration::from_secs(seconds))?;
        }

        tracing::debug!(
            target: "japikey.config",
            base_issuer = %config.base_issuer,
            max_version = config.max_version,
            key_resolution_timeout_secs = config.key_resolution_timeout.as_secs(),
            "Verification config loaded"
        );

        Ok(config)
    }

    /// The base issuer URL as configured.
    #[must_use]
    pub fn base_issuer(&self) -> &str {
        &self.base_issuer
    }

    /// Budget handed to the key resolver.
    #[must_use]
    pub fn key_resolution_timeout(&self) -> Duration {
        self.key_resolution_timeout
    }

    /// Highest accepted token format version.
    #[must_use]
    pub fn max_version(&self) -> u32 {
        self.max_version
    }

    /// Maximum token size in bytes; always [`MAX_TOKEN_BYTES`].
    #[must_use]
    pub fn max_token_bytes(&self) -> usize {
        MAX_TOKEN_BYTES
    }
}
