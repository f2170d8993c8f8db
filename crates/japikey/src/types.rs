//! Common data types for JAPIKey components.

use crate::error::{JapikeyError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Key identifier binding a token, its issuer and its key-set together.
///
/// Always a non-nil UUID once constructed through [`KeyId::parse`] or
/// [`KeyId::from_uuid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyId(Uuid);

impl KeyId {
    /// Create a new random key ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` for the nil UUID.
    pub fn from_uuid(uuid: Uuid) -> Result<Self> {
        if uuid.is_nil() {
            return Err(JapikeyError::validation("key id must not be nil"));
        }
        Ok(Self(uuid))
    }

    /// Parse a key ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` if the string is not a UUID or is
    /// the nil UUID.
    pub fn parse(value: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(value).map_err(|e| {
            tracing::debug!(target: "japikey.types", error = %e, "Invalid key id format");
            JapikeyError::validation("key id is not a valid UUID")
        })?;
        Self::from_uuid(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for KeyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated lowercase, the form embedded in `kid` and `iss`
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for KeyId {
    type Err = JapikeyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
