//! # JAPIKey Test Utilities
//!
//! Shared test utilities for the `japikey` crate.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (seeded keys for reproducible tests)
//! - Test data builders (`TestTokenBuilder`)
//! - Fixed test IDs (UUIDs, issuer constants)
//! - Custom assertions (`TokenAssertions` trait)
//! - Key resolvers that record how they were called (`CountingResolver`)
//! - Log event capture for asserting which pipeline stages ran
//!
//! ## Usage
//!
//! ```rust,ignore
//! use japikey_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let token = TestTokenBuilder::new()
//!         .for_subject("alice")
//!         .with_claim("role", "admin")
//!         .build();
//!
//!     token.assert_valid_japikey().assert_for_subject("alice");
//!
//!     let resolver = CountingResolver::serving(test_key_set(1, TEST_KEY_ID_1).unwrap());
//!     japikey::verify(&token, &test_verification_config(), &resolver).unwrap();
//!     assert_eq!(resolver.calls(), 1);
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod event_capture;
pub mod resolvers;
pub mod test_ids;
pub mod token_builders;
pub mod tracing_init;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use event_capture::*;
pub use resolvers::*;
pub use test_ids::*;
pub use token_builders::*;
pub use tracing_init::*;
