//! JAPIKey: API keys as RS256-signed JWTs.
//!
//! Each API key is a JWT signed by its own RSA key pair. The key ID in the
//! header is a UUID that also appears at the end of the `iss` claim and in the
//! single-entry JWKS document that publishes the public key. Verification
//! resolves the key by ID, checks the signature, and then checks that those
//! three places agree.
//!
//! ```no_run
//! use japikey::{issue, verify, IssueConfig, VerificationConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let expires_at = chrono::Utc::now() + chrono::Duration::days(30);
//! let issued = issue(&IssueConfig::new("user-42", "https://keys.example.com", expires_at))?;
//!
//! let config = VerificationConfig::new("https://keys.example.com")?;
//! let result = verify(&issued.token, &config, &issued.key_set)?;
//! assert_eq!(result.key_id, issued.key_id);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]

/// Unsigned big-integer codec for JWK members
pub mod base64_int;

/// Token header and claims
pub mod claims;

/// Verification configuration
pub mod config;

/// Error types
pub mod error;

/// Token issuance
pub mod issue;

/// Single-key JWKS codec
pub mod jwks;

/// Structural and claim validators
pub mod jwt;

/// RSA public key bound to a key ID
pub mod key;

/// Key identifier type
pub mod types;

/// Verification pipeline
pub mod verify;

/// `japikey-v<N>` version handling
pub mod version;

pub use config::{ConfigError, VerificationConfig};
pub use error::{ErrorKind, JapikeyError, Result};
pub use issue::{issue, sign, IssueConfig, IssuedJapikey};
pub use jwks::KeySet;
pub use key::PublicKeyMaterial;
pub use types::KeyId;
pub use verify::{should_verify, verify, KeyResolver, VerificationResult};
pub use version::Version;
