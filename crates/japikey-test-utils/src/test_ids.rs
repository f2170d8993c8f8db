//! Fixed test IDs for deterministic tests
//!
//! All test IDs are deterministic to ensure reproducible test results.
//! Using fixed UUIDs prevents flaky tests caused by random data.

use japikey::{KeyId, VerificationConfig};
use uuid::Uuid;

// Key IDs (1-99)
pub const TEST_KEY_ID_1: Uuid = Uuid::from_u128(1);
pub const TEST_KEY_ID_2: Uuid = Uuid::from_u128(2);
pub const TEST_KEY_ID_3: Uuid = Uuid::from_u128(3);

// Key seeds for crypto fixtures
pub const TEST_KEY_SEED_1: u8 = 1;
pub const TEST_KEY_SEED_2: u8 = 2;

// Issuers
pub const TEST_BASE_ISSUER: &str = "https://keys.test.japikey.dev";
pub const TEST_OTHER_BASE_ISSUER: &str = "https://keys.other.japikey.dev";

// Subjects
pub const TEST_SUBJECT_ALICE: &str = "alice";
pub const TEST_SUBJECT_BOB: &str = "bob";

/// Wrap a fixed UUID as a `KeyId`.
///
/// # Panics
///
/// Panics for the nil UUID.
pub fn test_key_id(uuid: Uuid) -> KeyId {
    KeyId::from_uuid(uuid).expect("test key ids must not be nil")
}

/// Verification config for [`TEST_BASE_ISSUER`] with default limits.
pub fn test_verification_config() -> VerificationConfig {
    VerificationConfig::new(TEST_BASE_ISSUER).expect("test base issuer is valid")
}
