//! End-to-end verification against real RS256 signatures
//!
//! Tokens are crafted with `TestTokenBuilder` and signed with deterministic
//! fixture keys, then run through `japikey::verify`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use japikey::config::MAX_TOKEN_BYTES;
use japikey::{should_verify, verify, ErrorKind, JapikeyError, VerificationConfig};
use japikey_test_utils::*;
use serde_json::json;
use std::time::Duration;

// ============================================================================
// Helper Functions
// ============================================================================

fn resolver() -> CountingResolver {
    CountingResolver::serving(test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap())
}

fn assert_validation(result: japikey::Result<japikey::VerificationResult>, message: &str) {
    let err = result.expect_err("verification should fail");
    assert_eq!(err.kind(), ErrorKind::Validation, "unexpected error: {err}");
    assert_eq!(err.message(), message, "unexpected error: {err}");
}

// ============================================================================
// Happy path
// ============================================================================

#[test]
fn test_valid_token_returns_extra_claims_and_key_id() {
    init_test_tracing();
    let token = TestTokenBuilder::new().with_claim("role", "admin").build();
    let resolver = resolver();

    let result = verify(&token, &test_verification_config(), &resolver).unwrap();

    assert_eq!(result.key_id, test_key_id(TEST_KEY_ID_1));
    assert_eq!(
        serde_json::Value::Object(result.claims),
        json!({"role": "admin"}),
        "only non-registered claims should be returned"
    );
    assert_eq!(result.version.number(), 1);
    assert_eq!(resolver.calls(), 1);
}

#[test]
fn test_nested_claim_values_are_preserved() {
    let limits = json!({"rpm": 60, "tags": ["a", "b"], "ratio": 0.5, "on": true, "none": null});
    let token = TestTokenBuilder::new()
        .with_claim("limits", limits.clone())
        .build();

    let result = verify(&token, &test_verification_config(), &resolver()).unwrap();
    assert_eq!(result.claims.get("limits"), Some(&limits));
}

#[test]
fn test_base_issuer_trailing_slash_is_equivalent() {
    let token = TestTokenBuilder::new().build();
    let config = VerificationConfig::new(format!("{TEST_BASE_ISSUER}/")).unwrap();

    assert!(verify(&token, &config, &resolver()).is_ok());
}

#[test]
fn test_resolver_receives_configured_timeout() {
    let token = TestTokenBuilder::new().build();
    let config = test_verification_config()
        .with_key_resolution_timeout(Duration::from_secs(2))
        .unwrap();
    let resolver = resolver();

    verify(&token, &config, &resolver).unwrap();

    assert_eq!(
        resolver.last_request(),
        Some((test_key_id(TEST_KEY_ID_1), Duration::from_secs(2)))
    );
}

// ============================================================================
// Size and structure
// ============================================================================

#[test]
fn test_oversized_token_rejected_before_key_resolution() {
    let token = TestTokenBuilder::new().with_padding(5000).build();
    assert!(token.len() > MAX_TOKEN_BYTES);
    let resolver = resolver();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver),
        "token exceeds maximum size",
    );
    assert_eq!(resolver.calls(), 0, "resolver must not run for oversized tokens");
}

#[test]
fn test_oversized_token_is_never_decoded() {
    let token = TestTokenBuilder::new().with_padding(5000).build();
    let resolver = resolver();

    let (result, events) =
        capture_events(|| verify(&token, &test_verification_config(), &resolver));

    assert_validation(result, "token exceeds maximum size");
    let japikey_events: Vec<_> = events
        .iter()
        .filter(|e| e.target.starts_with("japikey"))
        .collect();
    assert_eq!(japikey_events.len(), 1, "unexpected events: {japikey_events:?}");
    assert_eq!(japikey_events[0].target, "japikey.jwt");
    assert_eq!(
        japikey_events[0].message,
        "Token rejected: size exceeds maximum allowed"
    );
}

#[test]
fn test_small_malformed_token_reaches_decoder() {
    let (result, events) = capture_events(|| {
        verify("!!.!!.!!", &test_verification_config(), &resolver())
    });

    assert_validation(result, "malformed token header");
    assert!(
        events
            .iter()
            .any(|e| e.target == "japikey.jwt" && e.message.starts_with("Failed to decode")),
        "decoder should have logged: {events:?}"
    );
}

#[test]
fn test_token_at_size_limit_is_accepted() {
    let base_len = TestTokenBuilder::new().with_padding(1).build().len();
    // Three more pad bytes add exactly four base64 characters
    let steps = (MAX_TOKEN_BYTES - base_len) / 4;
    let token = TestTokenBuilder::new().with_padding(1 + 3 * steps).build();
    assert!(
        token.len() <= MAX_TOKEN_BYTES && token.len() > MAX_TOKEN_BYTES - 4,
        "unexpected token size {}",
        token.len()
    );

    assert!(verify(&token, &test_verification_config(), &resolver()).is_ok());
}

#[test]
fn test_missing_kid_rejected() {
    let token = TestTokenBuilder::new().without_kid().build();
    let resolver = resolver();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver),
        "token is missing key id",
    );
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn test_non_uuid_kid_rejected() {
    let token = TestTokenBuilder::new().with_raw_kid("key-2025-01").build();
    let resolver = resolver();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver),
        "key id is not a valid UUID",
    );
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn test_signed_token_with_malformed_header_member_rejected_as_structural() {
    let config = test_verification_config();

    for (member, value) in [("cty", json!(5)), ("x5c", json!("nope"))] {
        let token = TestTokenBuilder::new()
            .with_header_member(member, value)
            .build();
        let resolver = resolver();

        assert!(!should_verify(&token, &config), "{member}: pre-check should fail");
        assert_validation(verify(&token, &config, &resolver), "malformed token header");
        assert_eq!(resolver.calls(), 0, "{member}: resolver must not run");
    }
}

#[test]
fn test_missing_version_rejected() {
    let token = TestTokenBuilder::new().without_version().build();
    let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ============================================================================
// Algorithm
// ============================================================================

#[test]
fn test_hs256_token_rejected() {
    let token = TestTokenBuilder::new().with_algorithm("HS256").build();
    let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_none_algorithm_rejected() {
    let token = TestTokenBuilder::new().with_algorithm("none").build();
    let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_rs512_token_rejected() {
    let token = TestTokenBuilder::new().with_algorithm("RS512").build();
    let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// ============================================================================
// Signature
// ============================================================================

#[test]
fn test_token_signed_by_other_key_rejected() {
    let token = TestTokenBuilder::new()
        .signed_with_seed(TEST_KEY_SEED_2)
        .build();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver()),
        "signature verification failed",
    );
}

#[test]
fn test_tampered_claims_rejected() {
    let token = TestTokenBuilder::new().with_claim("role", "user").build();
    let forged_claims = TestTokenBuilder::new()
        .with_claim("role", "admin")
        .build()
        .split('.')
        .nth(1)
        .unwrap()
        .to_string();

    let mut parts: Vec<&str> = token.split('.').collect();
    parts[1] = &forged_claims;
    let tampered = parts.join(".");

    assert_validation(
        verify(&tampered, &test_verification_config(), &resolver()),
        "signature verification failed",
    );
}

// ============================================================================
// Issuer binding
// ============================================================================

#[test]
fn test_issuer_with_different_kid_rejected() {
    let token = TestTokenBuilder::new()
        .with_issuer(&format!("{TEST_BASE_ISSUER}/{TEST_KEY_ID_2}"))
        .build();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver()),
        "invalid issuer",
    );
}

#[test]
fn test_issuer_with_other_base_rejected() {
    let token = TestTokenBuilder::new()
        .with_base_issuer(TEST_OTHER_BASE_ISSUER)
        .build();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver()),
        "invalid issuer",
    );
}

#[test]
fn test_issuer_with_suffix_rejected() {
    let token = TestTokenBuilder::new()
        .with_issuer(&format!("{TEST_BASE_ISSUER}/{TEST_KEY_ID_1}/extra"))
        .build();

    assert_validation(
        verify(&token, &test_verification_config(), &resolver()),
        "invalid issuer",
    );
}

// ============================================================================
// Version
// ============================================================================

#[test]
fn test_future_version_rejected_by_default() {
    let token = TestTokenBuilder::new().with_version("japikey-v2").build();
    assert_validation(
        verify(&token, &test_verification_config(), &resolver()),
        "unsupported version",
    );
}

#[test]
fn test_future_version_accepted_when_configured() {
    let token = TestTokenBuilder::new().with_version("japikey-v2").build();
    let config = test_verification_config().with_max_version(2).unwrap();

    let result = verify(&token, &config, &resolver()).unwrap();
    assert_eq!(result.version.number(), 2);
}

#[test]
fn test_malformed_versions_rejected() {
    for ver in ["japikey-v0", "japikey-v01", "japikey-v1.0", "japikey-v", "v1", "JAPIKEY-V1"] {
        let token = TestTokenBuilder::new().with_version(ver).build();
        let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{ver} should be rejected");
    }
}

// ============================================================================
// Resolver failures
// ============================================================================

#[test]
fn test_unknown_kid_is_key_not_found() {
    let token = TestTokenBuilder::new().with_key_id(TEST_KEY_ID_3).build();
    let err = verify(&token, &test_verification_config(), &resolver()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
}

#[test]
fn test_resolver_failure_is_reported_as_key_not_found() {
    let token = TestTokenBuilder::new().build();
    let resolver =
        CountingResolver::failing(JapikeyError::Internal("redis timeout after 10s".to_string()));

    let err = verify(&token, &test_verification_config(), &resolver).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    assert!(!err.to_string().contains("redis"), "resolver detail leaked: {err}");
    assert_eq!(resolver.calls(), 1);
}

#[test]
fn test_closure_resolver() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();
    let resolver = |kid: &japikey::KeyId, _: Duration| -> japikey::Result<japikey::PublicKeyMaterial> {
        key_set.get_public_key(kid)
    };

    let token = TestTokenBuilder::new().build();
    assert!(verify(&token, &test_verification_config(), &resolver).is_ok());
}

// ============================================================================
// should_verify
// ============================================================================

#[test]
fn test_should_verify_matches_structural_checks() {
    let config = test_verification_config();

    assert!(should_verify(&TestTokenBuilder::new().build(), &config));
    // Signature is not checked by the pre-check
    assert!(should_verify(
        &TestTokenBuilder::new().signed_with_seed(TEST_KEY_SEED_2).build(),
        &config
    ));

    assert!(!should_verify(&TestTokenBuilder::new().with_padding(5000).build(), &config));
    assert!(!should_verify(&TestTokenBuilder::new().with_algorithm("HS256").build(), &config));
    assert!(!should_verify(&TestTokenBuilder::new().without_kid().build(), &config));
    assert!(!should_verify(
        &TestTokenBuilder::new().with_base_issuer(TEST_OTHER_BASE_ISSUER).build(),
        &config
    ));
    assert!(!should_verify(
        &TestTokenBuilder::new().with_version("japikey-v2").build(),
        &config
    ));
    assert!(!should_verify("not-a-token", &config));
}
