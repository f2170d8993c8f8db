//! Base64urlUInt codec for JWK integer parameters.
//!
//! Integers are written as their big-endian bytes using the minimum number of
//! octets, then base64url-encoded without padding. Zero is the single octet
//! `0x00`, which encodes to `"AA"`.

use crate::error::{JapikeyError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rsa::BigUint;

/// Encode an unsigned integer as minimal-octet, unpadded base64url.
#[must_use]
pub fn encode(value: &BigUint) -> String {
    // BigUint::to_bytes_be never emits leading zeros; zero is special-cased
    // so it becomes one 0x00 octet rather than nothing.
    if value.bits() == 0 {
        return URL_SAFE_NO_PAD.encode([0u8]);
    }
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

/// Decode an unpadded base64url string into an unsigned integer.
///
/// Decoding is lenient about leading zero octets; canonical form is enforced
/// by callers that re-encode and compare.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` for empty input, padding characters,
/// or characters outside the base64url alphabet.
pub fn decode(value: &str) -> Result<BigUint> {
    if value.is_empty() {
        return Err(JapikeyError::validation("base64 integer is empty"));
    }

    let bytes = URL_SAFE_NO_PAD.decode(value).map_err(|e| {
        tracing::debug!(target: "japikey.base64_int", error = %e, "Failed to decode base64url integer");
        JapikeyError::validation("base64 integer is not valid unpadded base64url")
    })?;

    Ok(BigUint::from_bytes_be(&bytes))
}
