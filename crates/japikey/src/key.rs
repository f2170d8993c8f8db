//! RSA public key material bound to its key identifier.

use crate::base64_int;
use crate::error::{JapikeyError, Result};
use crate::types::KeyId;
use jsonwebtoken::DecodingKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

/// An RSA public key together with the key ID that owns it.
///
/// Fields are private: the only ways to obtain a value are [`Self::new`]
/// and decoding a key-set, both of which validate their inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    key: RsaPublicKey,
    key_id: KeyId,
}

impl PublicKeyMaterial {
    /// Bind `key` to `key_id`.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` if `key_id` is nil.
    pub fn new(key: RsaPublicKey, key_id: KeyId) -> Result<Self> {
        if key_id.as_uuid().is_nil() {
            return Err(JapikeyError::validation("key id must not be nil"));
        }
        Ok(Self { key, key_id })
    }

    /// Reconstruct from raw modulus and exponent.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` if the components do not form a
    /// usable RSA public key.
    pub fn from_components(n: BigUint, e: BigUint, key_id: KeyId) -> Result<Self> {
        let key = RsaPublicKey::new(n, e).map_err(|e| {
            tracing::debug!(target: "japikey.key", error = %e, "Rejected RSA public key components");
            JapikeyError::validation("invalid RSA public key")
        })?;
        Self::new(key, key_id)
    }

    /// The RSA public key.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.key
    }

    /// The owning key ID.
    #[must_use]
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// The modulus `n`.
    #[must_use]
    pub fn modulus(&self) -> &BigUint {
        self.key.n()
    }

    /// The public exponent `e`.
    #[must_use]
    pub fn exponent(&self) -> &BigUint {
        self.key.e()
    }

    /// Build a `jsonwebtoken` RS256 decoding key.
    pub(crate) fn decoding_key(&self) -> Result<DecodingKey> {
        let n = base64_int::encode(self.key.n());
        let e = base64_int::encode(self.key.e());
        DecodingKey::from_rsa_components(&n, &e).map_err(|e| {
            tracing::error!(target: "japikey.key", error = %e, "Failed to build RSA decoding key");
            JapikeyError::internal("failed to prepare verification key")
        })
    }
}
