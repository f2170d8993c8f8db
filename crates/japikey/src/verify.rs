//! JAPIKey verification pipeline.
//!
//! # Security Checks
//!
//! 1. Size check - reject tokens > 4KB before parsing
//! 2. Decode header and claims without trusting them
//! 3. Extract and UUID-parse `kid`
//! 4. Resolve the public key through the caller's [`KeyResolver`]
//! 5. Verify the RS256 signature (`exp`/`nbf` checked with zero leeway)
//! 6. Check algorithm, issuer binding, version and `iat`
//!
//! The first failing step ends verification; no partial result is returned.
//! Every error carries a category, and signature failures never echo
//! library detail.

use crate::claims::Claims;
use crate::config::VerificationConfig;
use crate::error::{ErrorKind, JapikeyError, Result};
use crate::jwt::{
    check_algorithm, check_issued_at, check_issuer_binding, check_size, check_version,
    decode_unverified, extract_key_id,
};
use crate::jwks::KeySet;
use crate::key::PublicKeyMaterial;
use crate::types::KeyId;
use crate::version::Version;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::instrument;

/// Source of public keys for verification.
///
/// Implementations may perform I/O. `timeout` is the configured budget for
/// the lookup; enforcing it is the resolver's job, the pipeline neither
/// times out nor retries.
pub trait KeyResolver {
    /// Return the key for `key_id`.
    ///
    /// # Errors
    ///
    /// `JapikeyError::KeyNotFound` when the key is unknown. Any other error is
    /// reported to the verifier's caller as `KeyNotFound` as well.
    fn resolve(&self, key_id: &KeyId, timeout: Duration) -> Result<PublicKeyMaterial>;
}

impl<F> KeyResolver for F
where
    F: Fn(&KeyId, Duration) -> Result<PublicKeyMaterial>,
{
    fn resolve(&self, key_id: &KeyId, timeout: Duration) -> Result<PublicKeyMaterial> {
        self(key_id, timeout)
    }
}

impl KeyResolver for KeySet {
    fn resolve(&self, key_id: &KeyId, _timeout: Duration) -> Result<PublicKeyMaterial> {
        self.get_public_key(key_id)
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Key the token was verified against.
    pub key_id: KeyId,

    /// Every non-registered claim, verbatim.
    pub claims: Map<String, Value>,

    /// The token's validated format version.
    pub version: Version,
}

/// Verify a JAPIKey token.
///
/// # Errors
///
/// - `JapikeyError::Validation` for size, structure, kid, algorithm,
///   signature, issuer, version and time-claim failures
/// - `JapikeyError::KeyNotFound` when the resolver cannot supply the key
/// - `JapikeyError::Internal` if a resolved key cannot be prepared for
///   verification
#[instrument(skip_all)]
pub fn verify<R>(
    token: &str,
    config: &VerificationConfig,
    resolver: &R,
) -> Result<VerificationResult>
where
    R: KeyResolver + ?Sized,
{
    // 1. Size, before any parsing
    check_size(token)?;

    // 2. Structural decode, signature not yet checked
    let unverified = decode_unverified(token)?;

    // 3. kid
    let key_id = extract_key_id(&unverified.header)?;

    // 4. Key resolution
    let key = resolve_key(resolver, &key_id, config.key_resolution_timeout())?;

    // 5. Signature and exp/nbf
    let claims = verify_signature(token, &key)?;

    // 6. Claims, now authenticated
    check_algorithm(&unverified.header)?;
    check_issuer_binding(&claims, &key_id, config.base_issuer())?;
    let version = check_version(&claims, config.max_version())?;
    check_issued_at(&claims)?;

    tracing::debug!(target: "japikey.verify", kid = %key_id, "Token validated successfully");

    Ok(VerificationResult {
        key_id,
        claims: claims.extra,
        version,
    })
}

/// Cheap structural pre-check.
///
/// Returns `false` for anything [`verify`] rejects without needing the key:
/// size, format, algorithm, kid, issuer binding and version. A `true` result
/// does not mean the token is valid; the signature and time claims are not
/// examined.
#[must_use]
pub fn should_verify(token: &str, config: &VerificationConfig) -> bool {
    match precheck(token, config) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: "japikey.verify", error = %e, "Token failed pre-check");
            false
        }
    }
}

fn precheck(token: &str, config: &VerificationConfig) -> Result<()> {
    check_size(token)?;
    let unverified = decode_unverified(token)?;
    check_algorithm(&unverified.header)?;
    let key_id = extract_key_id(&unverified.header)?;
    check_issuer_binding(&unverified.claims, &key_id, config.base_issuer())?;
    check_version(&unverified.claims, config.max_version())?;
    Ok(())
}

/// Call the resolver, hiding any failure detail behind `KeyNotFound`.
fn resolve_key<R>(resolver: &R, key_id: &KeyId, timeout: Duration) -> Result<PublicKeyMaterial>
where
    R: KeyResolver + ?Sized,
{
    let key = resolver.resolve(key_id, timeout).map_err(|e| {
        if e.kind() == ErrorKind::KeyNotFound {
            tracing::debug!(target: "japikey.verify", kid = %key_id, "Key not found");
            e
        } else {
            tracing::warn!(
                target: "japikey.verify",
                kid = %key_id,
                error = %e,
                "Key resolver failed"
            );
            JapikeyError::key_not_found("key could not be resolved")
        }
    })?;

    if key.key_id() != *key_id {
        tracing::warn!(
            target: "japikey.verify",
            kid = %key_id,
            resolved = %key.key_id(),
            "Key resolver returned a key for a different kid"
        );
        return Err(JapikeyError::key_not_found("key could not be resolved"));
    }

    Ok(key)
}

/// Verify the RS256 signature and the `exp`/`nbf` claims.
fn verify_signature(token: &str, key: &PublicKeyMaterial) -> Result<Claims> {
    let decoding_key = key.decoding_key()?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp"]);
    // Audience is application-defined; the issuer is bound to the kid separately
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "japikey.verify", error = %e, "Token verification failed");
        let message = match e.kind() {
            JwtErrorKind::ExpiredSignature => "token has expired",
            JwtErrorKind::ImmatureSignature => "token is not yet valid",
            JwtErrorKind::MissingRequiredClaim(_) => "token is missing a required claim",
            JwtErrorKind::InvalidAlgorithm => "invalid algorithm",
            _ => "signature verification failed",
        };
        JapikeyError::validation(message)
    })?;

    Ok(token_data.claims)
}
