//! Structural and claim checks for JAPIKey tokens.
//!
//! Everything here is pure: no key lookup, no signature verification, no I/O.
//! The verification pipeline in [`crate::verify`] sequences these checks
//! around the cryptographic step.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted
//! - The issuer must equal the base issuer followed by the key ID, exactly
//! - Detailed rejection reasons are logged at debug level only

use crate::claims::{Claims, TokenHeader};
use crate::config::MAX_TOKEN_BYTES;
use crate::error::{JapikeyError, Result};
use crate::types::KeyId;
use crate::version::Version;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;

/// The only accepted signing algorithm.
pub const REQUIRED_ALGORITHM: &str = "RS256";

/// Header and claims decoded without checking the signature.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    /// The JOSE header.
    pub header: TokenHeader,
    /// The claims, NOT yet authenticated.
    pub claims: Claims,
}

/// Reject tokens larger than [`MAX_TOKEN_BYTES`].
///
/// # Errors
///
/// Returns `JapikeyError::Validation` if the token is too large.
pub fn check_size(token: &str) -> Result<()> {
    if token.len() > MAX_TOKEN_BYTES {
        tracing::debug!(
            target: "japikey.jwt",
            token_size = token.len(),
            max_size = MAX_TOKEN_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JapikeyError::validation("token exceeds maximum size"));
    }
    Ok(())
}

/// Decode header and claims without verifying the signature.
///
/// The caller must have run [`check_size`] first. The returned claims are
/// only fit for key lookup and cheap pre-checks.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` if the token is not three
/// dot-separated base64url segments carrying a JSON header and JSON claims.
pub fn decode_unverified(token: &str) -> Result<UnverifiedToken> {
    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    let [header_part, claims_part, signature_part] = parts.as_slice() else {
        tracing::debug!(
            target: "japikey.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JapikeyError::validation("malformed token"));
    };

    if signature_part.is_empty() {
        tracing::debug!(target: "japikey.jwt", "Token rejected: empty signature segment");
        return Err(JapikeyError::validation("malformed token"));
    }

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "japikey.jwt", error = %e, "Failed to decode JWT header base64");
        JapikeyError::validation("malformed token header")
    })?;
    let header: TokenHeader = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "japikey.jwt", error = %e, "Failed to parse JWT header JSON");
        JapikeyError::validation("malformed token header")
    })?;

    // Signature verification parses the full JOSE header, so malformed
    // standard members (`cty`, `x5c`, ...) are rejected here too. Algorithms
    // jsonwebtoken does not know are left to `check_algorithm`.
    if header.alg.parse::<Algorithm>().is_ok() {
        jsonwebtoken::decode_header(token).map_err(|e| {
            tracing::debug!(target: "japikey.jwt", error = %e, "JWT header has malformed members");
            JapikeyError::validation("malformed token header")
        })?;
    }

    let claims_bytes = URL_SAFE_NO_PAD.decode(claims_part).map_err(|e| {
        tracing::debug!(target: "japikey.jwt", error = %e, "Failed to decode JWT claims base64");
        JapikeyError::validation("malformed token claims")
    })?;
    let claims: Claims = serde_json::from_slice(&claims_bytes).map_err(|e| {
        tracing::debug!(target: "japikey.jwt", error = %e, "Failed to parse JWT claims JSON");
        JapikeyError::validation("malformed token claims")
    })?;

    Ok(UnverifiedToken { header, claims })
}

/// Extract and parse the `kid` header as a [`KeyId`].
///
/// # Errors
///
/// Returns `JapikeyError::Validation` if `kid` is missing or not a UUID.
pub fn extract_key_id(header: &TokenHeader) -> Result<KeyId> {
    let kid = header.kid.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
        tracing::debug!(target: "japikey.jwt", "Token rejected: missing kid");
        JapikeyError::validation("token is missing key id")
    })?;
    KeyId::parse(kid)
}

/// Require `alg` to be exactly `RS256`.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` for any other value, including `none`
/// and symmetric algorithms.
pub fn check_algorithm(header: &TokenHeader) -> Result<()> {
    if header.alg != REQUIRED_ALGORITHM {
        tracing::debug!(
            target: "japikey.jwt",
            alg = %header.alg,
            "Token rejected: unsupported algorithm"
        );
        return Err(JapikeyError::validation("invalid algorithm"));
    }
    Ok(())
}

/// Append a trailing `/` to the base issuer if missing.
#[must_use]
pub fn normalize_base_issuer(base_issuer: &str) -> String {
    if base_issuer.ends_with('/') {
        base_issuer.to_string()
    } else {
        format!("{base_issuer}/")
    }
}

/// The issuer a token signed with `key_id` must carry.
#[must_use]
pub fn expected_issuer(base_issuer: &str, key_id: &KeyId) -> String {
    format!("{}{key_id}", normalize_base_issuer(base_issuer))
}

/// Require `claims.iss` to equal the normalized base issuer plus `key_id`.
///
/// The comparison is exact string equality; a prefix match would accept any
/// issuer that merely starts with the expected value.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` on mismatch.
pub fn check_issuer_binding(claims: &Claims, key_id: &KeyId, base_issuer: &str) -> Result<()> {
    let expected = expected_issuer(base_issuer, key_id);
    if claims.iss != expected {
        tracing::debug!(
            target: "japikey.jwt",
            kid = %key_id,
            "Token rejected: issuer does not match key id"
        );
        return Err(JapikeyError::validation("invalid issuer"));
    }
    Ok(())
}

/// Validate the `ver` claim against `max_version`.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` from [`Version::parse`].
pub fn check_version(claims: &Claims, max_version: u32) -> Result<Version> {
    Version::parse(&claims.ver, max_version)
}

/// Reject an `iat` later than `now`.
///
/// `exp` and `nbf` are enforced by `jsonwebtoken` during signature
/// verification; it does not look at `iat`, so that check lives here. There
/// is no clock-skew allowance.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` if `iat` is in the future.
pub fn check_issued_at(claims: &Claims) -> Result<()> {
    check_issued_at_at(claims, chrono::Utc::now().timestamp())
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// Prefer [`check_issued_at`] in production code. This variant exists so that
/// boundary conditions can be unit-tested without wall-clock dependence.
pub(crate) fn check_issued_at_at(claims: &Claims, now: i64) -> Result<()> {
    match claims.iat {
        Some(iat) if iat > now => {
            tracing::debug!(
                target: "japikey.jwt",
                iat = iat,
                now = now,
                "Token rejected: iat in the future"
            );
            Err(JapikeyError::validation("token issued in the future"))
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================
