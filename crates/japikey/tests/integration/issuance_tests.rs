//! Integration tests for issuance: issue, publish the key-set, verify

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use japikey::{issue, sign, verify, ErrorKind, IssueConfig, KeySet};
use japikey_test_utils::*;
use serde_json::json;

fn issue_config() -> IssueConfig {
    IssueConfig::new(
        TEST_SUBJECT_BOB,
        TEST_BASE_ISSUER,
        Utc::now() + Duration::hours(1),
    )
    .with_claim("role", "admin")
    .with_claim("quota", json!({"daily": 1000}))
}

#[test]
fn test_issued_token_verifies_through_published_key_set() {
    init_test_tracing();
    let issued = issue(&issue_config()).unwrap();

    issued
        .token
        .assert_valid_japikey()
        .assert_signed_by(&issued.key_id)
        .assert_issued_under(TEST_BASE_ISSUER)
        .assert_for_subject(TEST_SUBJECT_BOB)
        .assert_expires_in(3600)
        .assert_has_claim("role", &json!("admin"));

    // The verifier only ever sees the published JSON
    let published = issued.key_set.to_json().unwrap();
    let resolver = CountingResolver::serving(KeySet::from_json(&published).unwrap());

    let result = verify(&issued.token, &test_verification_config(), &resolver).unwrap();

    assert_eq!(result.key_id, issued.key_id);
    assert_eq!(result.claims.get("role"), Some(&json!("admin")));
    assert_eq!(result.claims.get("quota"), Some(&json!({"daily": 1000})));
    assert_eq!(resolver.last_request().map(|(kid, _)| kid), Some(issued.key_id));
}

#[test]
fn test_each_issue_uses_a_fresh_key() {
    let first = issue(&issue_config()).unwrap();
    let second = issue(&issue_config()).unwrap();

    assert_ne!(first.key_id, second.key_id);
    assert_ne!(first.key_set, second.key_set);

    // A token does not verify against another token's key-set
    let err = verify(&first.token, &test_verification_config(), &second.key_set).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
}

#[test]
fn test_signed_with_fixture_key_verifies_with_fixture_key_set() -> Result<(), anyhow::Error> {
    let private_key = test_private_key(TEST_KEY_SEED_1)?;
    let key_id = test_key_id(TEST_KEY_ID_1);

    let token = sign(&issue_config(), &private_key, &key_id)?;

    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1)?;
    let result = verify(&token, &test_verification_config(), &key_set)?;
    assert_eq!(result.key_id, key_id);

    Ok(())
}

#[test]
fn test_reserved_claims_cannot_be_overridden() {
    let config = issue_config()
        .with_claim("iss", format!("{TEST_OTHER_BASE_ISSUER}/{TEST_KEY_ID_1}"))
        .with_claim("ver", "japikey-v7")
        .with_claim("sub", "mallory");
    let issued = issue(&config).unwrap();

    issued
        .token
        .assert_issued_under(TEST_BASE_ISSUER)
        .assert_for_subject(TEST_SUBJECT_BOB);

    let result = verify(&issued.token, &test_verification_config(), &issued.key_set).unwrap();
    assert!(result.claims.get("sub").is_none());
    assert_eq!(result.version.number(), 1);
}

#[test]
fn test_issue_rejects_past_expiry() {
    let config = IssueConfig::new(
        TEST_SUBJECT_BOB,
        TEST_BASE_ISSUER,
        Utc::now() - Duration::seconds(1),
    );

    let err = issue(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_verification_under_other_base_issuer_fails() {
    let issued = issue(&issue_config()).unwrap();
    let config = japikey::VerificationConfig::new(TEST_OTHER_BASE_ISSUER).unwrap();

    let err = verify(&issued.token, &config, &issued.key_set).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "invalid issuer");
}
