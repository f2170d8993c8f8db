//! Error taxonomy shared by every JAPIKey component.
//!
//! All failures fall into one of four categories. Callers branch on
//! [`JapikeyError::kind`]; the message is human-readable and never contains
//! token contents or library internals.

use std::fmt;
use thiserror::Error;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Structural, format or claim failure.
    Validation,
    /// Codec-level encode/decode or round-trip inconsistency.
    Conversion,
    /// The requested key identifier is not available.
    KeyNotFound,
    /// Unexpected cryptographic or library failure.
    Internal,
}

impl ErrorKind {
    /// Stable string form, suitable for metrics labels and API error codes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Conversion => "conversion_error",
            ErrorKind::KeyNotFound => "key_not_found",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by JAPIKey operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JapikeyError {
    /// Structural/format/claim failure: bad size, algorithm, version, issuer,
    /// kid, JSON shape, expired or not-yet-valid token.
    #[error("validation error: {0}")]
    Validation(String),

    /// Codec-level failure, e.g. a non-canonical integer encoding detected on
    /// re-encode.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Key identifier absent from the key source.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Failure not attributable to caller input (key generation, signing).
    #[error("internal error: {0}")]
    Internal(String),
}

impl JapikeyError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    pub(crate) fn key_not_found(message: impl Into<String>) -> Self {
        Self::KeyNotFound(message.into())
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JapikeyError::Validation(_) => ErrorKind::Validation,
            JapikeyError::Conversion(_) => ErrorKind::Conversion,
            JapikeyError::KeyNotFound(_) => ErrorKind::KeyNotFound,
            JapikeyError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The human-readable message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            JapikeyError::Validation(msg)
            | JapikeyError::Conversion(msg)
            | JapikeyError::KeyNotFound(msg)
            | JapikeyError::Internal(msg) => msg,
        }
    }
}

/// Result type alias using `JapikeyError`
pub type Result<T> = std::result::Result<T, JapikeyError>;
