//! Single-key JWKS codec.
//!
//! A JAPIKey key-set always holds exactly one RSA public key. The wire form
//! is:
//!
//! ```json
//! {"keys":[{"kty":"RSA","kid":"<uuid>","n":"<base64url>","e":"<base64url>"}]}
//! ```
//!
//! # Decoding
//!
//! Decoding is an explicit three-step pipeline:
//!
//! 1. [`validate_shape`] inspects the untyped JSON: `keys` must be an array of
//!    exactly one object with exactly the members `kty`, `kid`, `n`, `e`.
//!    Typed deserialization would silently drop unknown members, so this
//!    check runs on `serde_json::Value` first.
//! 2. The document is deserialized into typed records.
//! 3. The record is validated and the key reconstructed through the same
//!    path as [`KeySet::build`]; `n` and `e` are then re-encoded and must
//!    match the input byte-for-byte, which rejects non-canonical integers.

use crate::base64_int;
use crate::error::{JapikeyError, Result};
use crate::key::PublicKeyMaterial;
use crate::types::KeyId;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only key type a JAPIKey key-set carries.
pub const KEY_TYPE_RSA: &str = "RSA";

/// Members of the single JWK object, exactly.
const JWK_MEMBERS: [&str; 4] = ["kty", "kid", "n", "e"];

/// Typed JWKS document.
#[derive(Debug, Serialize, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkRecord>,
}

/// Typed JWK object, in wire field order.
#[derive(Debug, Serialize, Deserialize)]
struct JwkRecord {
    kty: String,
    kid: String,
    n: String,
    e: String,
}

/// A key-set holding exactly one RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    key: PublicKeyMaterial,
}

impl KeySet {
    /// Build a key-set from an RSA public key and its key ID.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` if `key_id` is nil.
    pub fn build(public_key: RsaPublicKey, key_id: KeyId) -> Result<Self> {
        Ok(Self {
            key: PublicKeyMaterial::new(public_key, key_id)?,
        })
    }

    /// Wrap already-validated key material.
    #[must_use]
    pub fn from_material(key: PublicKeyMaterial) -> Self {
        Self { key }
    }

    /// The ID of the single key in this set.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        self.key.key_id()
    }

    /// Return the public key if `key_id` matches the stored key.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::KeyNotFound` for any other key ID.
    pub fn get_public_key(&self, key_id: &KeyId) -> Result<PublicKeyMaterial> {
        if self.key.key_id() != *key_id {
            tracing::debug!(
                target: "japikey.jwks",
                requested = %key_id,
                available = %self.key.key_id(),
                "Key not present in key set"
            );
            return Err(JapikeyError::key_not_found("key id not present in key set"));
        }
        Ok(self.key.clone())
    }

    /// Serialize to the JWKS wire form.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Conversion` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_document()).map_err(|e| {
            tracing::error!(target: "japikey.jwks", error = %e, "Failed to serialize key set");
            JapikeyError::conversion("failed to serialize key set")
        })
    }

    /// Serialize to a JSON value, e.g. for embedding in an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Conversion` if serialization fails.
    pub fn to_json_value(&self) -> Result<Value> {
        serde_json::to_value(self.to_document()).map_err(|e| {
            tracing::error!(target: "japikey.jwks", error = %e, "Failed to serialize key set");
            JapikeyError::conversion("failed to serialize key set")
        })
    }

    /// Decode and validate a JWKS document.
    ///
    /// The document must be exactly `{"keys": [{"kty", "kid", "n", "e"}]}`.
    /// Members beyond those, at the top level or in the key, are rejected
    /// rather than ignored, so `{"keys": [...], "x": 1}` fails validation.
    ///
    /// # Errors
    ///
    /// - `JapikeyError::Validation` for invalid JSON, a shape deviation, a
    ///   non-RSA key type, a malformed kid, or undecodable/invalid integers
    /// - `JapikeyError::Conversion` if `n` or `e` is not in canonical form
    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data).map_err(|e| {
            tracing::debug!(target: "japikey.jwks", error = %e, "Key set is not valid JSON");
            JapikeyError::validation("key set is not valid JSON")
        })?;
        Self::from_json_value(value)
    }

    /// Decode and validate an already-parsed JWKS document.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_json`].
    pub fn from_json_value(value: Value) -> Result<Self> {
        validate_shape(&value)?;

        let document: JwksDocument = serde_json::from_value(value).map_err(|e| {
            tracing::debug!(target: "japikey.jwks", error = %e, "Key set members have wrong types");
            JapikeyError::validation("key set members have invalid types")
        })?;

        let mut records = document.keys.into_iter();
        let (Some(record), None) = (records.next(), records.next()) else {
            return Err(JapikeyError::validation("key set must contain exactly one key"));
        };

        decode_record(&record)
    }

    fn to_document(&self) -> JwksDocument {
        JwksDocument {
            keys: vec![JwkRecord {
                kty: KEY_TYPE_RSA.to_string(),
                kid: self.key.key_id().to_string(),
                n: base64_int::encode(self.key.modulus()),
                e: base64_int::encode(self.key.exponent()),
            }],
        }
    }
}

/// Untyped shape check of a JWKS document.
///
/// # Errors
///
/// Returns `JapikeyError::Validation` unless the document is an object whose
/// only member is `keys`, holding an array of exactly one object with exactly
/// the members `kty`, `kid`, `n` and `e`.
pub fn validate_shape(value: &Value) -> Result<()> {
    let document = value
        .as_object()
        .ok_or_else(|| JapikeyError::validation("key set must be a JSON object"))?;

    if document.len() != 1 {
        tracing::debug!(
            target: "japikey.jwks",
            members = document.len(),
            "Key set rejected: unexpected top-level members"
        );
        return Err(JapikeyError::validation("key set must contain only 'keys'"));
    }

    let keys = document
        .get("keys")
        .ok_or_else(|| JapikeyError::validation("key set is missing 'keys'"))?
        .as_array()
        .ok_or_else(|| JapikeyError::validation("'keys' must be an array"))?;

    let [key] = keys.as_slice() else {
        tracing::debug!(
            target: "japikey.jwks",
            key_count = keys.len(),
            "Key set rejected: wrong number of keys"
        );
        return Err(JapikeyError::validation("key set must contain exactly one key"));
    };

    let key = key
        .as_object()
        .ok_or_else(|| JapikeyError::validation("key must be a JSON object"))?;

    if key.len() != JWK_MEMBERS.len() || !JWK_MEMBERS.iter().all(|m| key.contains_key(*m)) {
        tracing::debug!(
            target: "japikey.jwks",
            members = key.len(),
            "Key set rejected: key members differ from kty/kid/n/e"
        );
        return Err(JapikeyError::validation(
            "key must have exactly the members kty, kid, n, e",
        ));
    }

    Ok(())
}

/// Typed validation and reconstruction of the single JWK.
fn decode_record(record: &JwkRecord) -> Result<KeySet> {
    if record.kty != KEY_TYPE_RSA {
        tracing::debug!(target: "japikey.jwks", kty = %record.kty, "Key set rejected: unsupported key type");
        return Err(JapikeyError::validation("unsupported key type"));
    }

    let n = base64_int::decode(&record.n)?;
    let e = base64_int::decode(&record.e)?;
    let key_id = KeyId::parse(&record.kid)?;

    let material = PublicKeyMaterial::from_components(n, e, key_id)?;
    let key_set = KeySet::build(material.public_key().clone(), key_id)?;

    // Canonical form check: re-encoding must reproduce the input exactly
    let n_encoded = base64_int::encode(key_set.key.modulus());
    let e_encoded = base64_int::encode(key_set.key.exponent());
    if n_encoded != record.n || e_encoded != record.e {
        tracing::debug!(
            target: "japikey.jwks",
            n_matches = n_encoded == record.n,
            e_matches = e_encoded == record.e,
            "Key set rejected: non-canonical integer encoding"
        );
        return Err(JapikeyError::conversion(
            "key parameters are not canonically encoded",
        ));
    }

    Ok(key_set)
}
