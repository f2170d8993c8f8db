//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible RSA-2048 keypairs. All fixtures are deterministic
//! based on seed values, and each seed's key is generated once per process.

use japikey::{KeyId, KeySet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use uuid::Uuid;

/// RSA modulus size for fixture keys. `jsonwebtoken` refuses smaller keys.
pub const TEST_KEY_BITS: usize = 2048;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

static KEY_CACHE: OnceLock<Mutex<HashMap<u8, RsaPrivateKey>>> = OnceLock::new();

/// Generate a deterministic RSA private key for testing.
///
/// The same seed always produces the same keypair, ensuring test reproducibility.
///
/// # Example
/// ```rust,ignore
/// let key = test_private_key(1)?;
/// // Same seed always produces same key
/// assert_eq!(key, test_private_key(1)?);
/// ```
pub fn test_private_key(seed: u8) -> Result<RsaPrivateKey, FixtureError> {
    let cache = KEY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache
        .lock()
        .map_err(|e| FixtureError::Crypto(format!("Key cache poisoned: {e}")))?;

    if let Some(key) = cache.get(&seed) {
        return Ok(key.clone());
    }

    // Note: a seeded StdRng is deterministic and suitable for testing only
    let mut rng = StdRng::seed_from_u64(u64::from(seed));
    let key = RsaPrivateKey::new(&mut rng, TEST_KEY_BITS)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {e}")))?;

    cache.insert(seed, key.clone());
    Ok(key)
}

/// Public half of [`test_private_key`].
pub fn test_public_key(seed: u8) -> Result<RsaPublicKey, FixtureError> {
    Ok(RsaPublicKey::from(&test_private_key(seed)?))
}

/// PKCS#1 PEM encoding of [`test_private_key`], as `EncodingKey::from_rsa_pem` expects.
pub fn test_private_key_pem(seed: u8) -> Result<String, FixtureError> {
    let pem = test_private_key(seed)?
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| FixtureError::Crypto(format!("Failed to encode test key: {e}")))?;
    Ok(pem.to_string())
}

/// Key-set publishing the public key for `seed` under `key_id`.
pub fn test_key_set(seed: u8, key_id: Uuid) -> Result<KeySet, FixtureError> {
    let key_id = KeyId::from_uuid(key_id)
        .map_err(|e| FixtureError::Crypto(format!("Invalid test key id: {e}")))?;
    KeySet::build(test_public_key(seed)?, key_id)
        .map_err(|e| FixtureError::Crypto(format!("Failed to build test key set: {e}")))
}

/// Shared secret for HMAC-signed tokens in algorithm-confusion tests.
pub fn test_hmac_secret() -> Vec<u8> {
    vec![
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d,
        0x1e, 0x1f,
    ]
}
