//! Integration tests for the single-key JWKS codec with real RSA keys

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use japikey::{verify, ErrorKind, KeySet};
use japikey_test_utils::*;
use rsa::traits::PublicKeyParts;
use serde_json::{json, Value};

#[test]
fn test_round_trip_preserves_key_and_kid() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();

    let decoded = KeySet::from_json(&key_set.to_json().unwrap()).unwrap();

    assert_eq!(decoded, key_set);
    let key = decoded.get_public_key(&test_key_id(TEST_KEY_ID_1)).unwrap();
    assert_eq!(key.public_key(), &test_public_key(TEST_KEY_SEED_1).unwrap());
}

#[test]
fn test_wire_form() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();
    let value: Value = serde_json::from_str(&key_set.to_json().unwrap()).unwrap();

    let keys = value["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    let key = keys[0].as_object().unwrap();
    assert_eq!(key.len(), 4, "unexpected members: {:?}", key.keys());
    assert_eq!(key["kty"], "RSA");
    assert_eq!(key["kid"], TEST_KEY_ID_1.to_string());
    assert_eq!(key["e"], "AQAB");
    // 2048-bit modulus: 256 bytes, 342 unpadded base64url characters
    assert_eq!(key["n"].as_str().unwrap().len(), 342);
    assert!(!key["n"].as_str().unwrap().contains('='));
}

#[test]
fn test_decoded_key_set_verifies_tokens() {
    let json = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1)
        .unwrap()
        .to_json()
        .unwrap();
    let key_set = KeySet::from_json(&json).unwrap();

    let token = TestTokenBuilder::new().build();
    assert!(verify(&token, &test_verification_config(), &key_set).is_ok());
}

#[test]
fn test_wrong_kid_is_key_not_found() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();
    let err = key_set.get_public_key(&test_key_id(TEST_KEY_ID_2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
}

#[test]
fn test_shape_violations_are_rejected() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();
    let valid = key_set.to_json_value().unwrap();
    let jwk = valid["keys"][0].clone();

    let mut extra_member = jwk.clone();
    extra_member["alg"] = json!("RS256");

    let mut missing_member = jwk.clone();
    missing_member.as_object_mut().unwrap().remove("e");

    let cases = [
        json!({"keys": [jwk.clone(), jwk.clone()]}),
        json!({"keys": []}),
        json!({"keys": [extra_member]}),
        json!({"keys": [missing_member]}),
        json!({"keys": [jwk.clone()], "extra": true}),
        json!({"keys": jwk.clone()}),
        json!([jwk]),
    ];

    for case in cases {
        let err = KeySet::from_json(&case.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "accepted {case}");
    }
}

#[test]
fn test_non_canonical_modulus_is_rejected() {
    let key_set = test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1).unwrap();
    let mut value = key_set.to_json_value().unwrap();

    // Prepend a zero byte: same integer, non-minimal encoding
    let mut n_bytes = vec![0u8];
    n_bytes.extend(key_set.get_public_key(&key_set.key_id()).unwrap().modulus().to_bytes_be());
    value["keys"][0]["n"] = json!(base64_url(&n_bytes));

    let err = KeySet::from_json_value(value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
}

#[test]
fn test_modulus_bits_survive_round_trip() {
    let key_set = test_key_set(TEST_KEY_SEED_2, TEST_KEY_ID_2).unwrap();
    let decoded = KeySet::from_json(&key_set.to_json().unwrap()).unwrap();
    let key = decoded.get_public_key(&test_key_id(TEST_KEY_ID_2)).unwrap();
    assert_eq!(key.public_key().n().bits(), 2048);
}

fn base64_url(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.encode(bytes)
}
