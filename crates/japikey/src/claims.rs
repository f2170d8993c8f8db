//! JAPIKey token header and claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Claim names set by the issuer that caller-supplied claims may never
/// override.
pub const RESERVED_CLAIMS: [&str; 7] = ["sub", "iss", "aud", "exp", "nbf", "iat", "ver"];

/// JOSE header fields inspected before signature verification.
///
/// `alg` is kept as a raw string so that unsupported values (`none`,
/// `HS256`, ...) reach the algorithm check instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm.
    pub alg: String,

    /// Key ID, expected to be a UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Media type, normally `JWT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// The `aud` claim: a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "value"`
    Single(String),
    /// `"aud": ["a", "b"]`
    Multiple(Vec<String>),
}

/// JAPIKey token claims.
///
/// Registered claims are typed; every other claim lands in `extra` with its
/// JSON value preserved verbatim.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the API key's owner) - redacted in Debug output.
    pub sub: String,

    /// Issuer: base issuer URL followed by the key ID.
    pub iss: String,

    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Not-before timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issued-at timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Format version, `japikey-v<N>`.
    pub ver: String,

    /// All non-registered claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("nbf", &self.nbf)
            .field("iat", &self.iat)
            .field("ver", &self.ver)
            .field("extra_claims", &self.extra.len())
            .finish()
    }
}
