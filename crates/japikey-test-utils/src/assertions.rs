//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for the structure of JAPIKey tokens.
//! None of them verify the signature; use `japikey::verify` for that.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use japikey::jwt::expected_issuer;
use japikey::KeyId;
use serde::Deserialize;
use serde_json::Value;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub exp: i64,
    pub ver: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

fn header(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("Failed to parse JWT header")
}

fn claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// issued.token
///     .assert_valid_japikey()
///     .assert_signed_by(&issued.key_id)
///     .assert_has_claim("role", &json!("admin"));
/// ```
pub trait TokenAssertions {
    /// Assert the token has JAPIKey structure: RS256 header with a UUID kid,
    /// the registered claims present, and `iss` ending in the kid
    fn assert_valid_japikey(&self) -> &Self;

    /// Assert that the token was signed by the specified key
    fn assert_signed_by(&self, key_id: &KeyId) -> &Self;

    /// Assert that `iss` is `base_issuer` bound to the token's kid
    fn assert_issued_under(&self, base_issuer: &str) -> &Self;

    /// Assert that the token expires within the specified seconds
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that a non-registered claim has the given value
    fn assert_has_claim(&self, name: &str, value: &Value) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_japikey(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );
        assert!(!parts[2].is_empty(), "JWT signature must not be empty");

        let header = header(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let kid = header.kid.expect("JAPIKey header must carry a kid");
        let key_id = KeyId::parse(&kid).unwrap_or_else(|e| panic!("kid '{kid}' is not a UUID: {e}"));

        let claims = claims(self);
        assert!(
            claims.iss.ends_with(&key_id.to_string()),
            "Issuer '{}' is not bound to kid '{}'",
            claims.iss,
            key_id
        );
        assert!(
            claims.ver.starts_with("japikey-v"),
            "Unexpected version '{}'",
            claims.ver
        );

        self
    }

    fn assert_signed_by(&self, key_id: &KeyId) -> &Self {
        let jwt_header = header(self);

        assert_eq!(
            jwt_header.kid.as_deref(),
            Some(key_id.to_string().as_str()),
            "Expected key_id '{}', got {:?}",
            key_id,
            jwt_header.kid
        );

        self
    }

    fn assert_issued_under(&self, base_issuer: &str) -> &Self {
        let kid = header(self).kid.expect("JAPIKey header must carry a kid");
        let key_id = KeyId::parse(&kid).expect("kid must be a UUID");
        let claims = claims(self);

        assert_eq!(
            claims.iss,
            expected_issuer(base_issuer, &key_id),
            "Issuer not derived from base issuer '{base_issuer}'"
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = claims(self);

        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;

        // Allow 5-second tolerance for slow test runs
        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);

        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_has_claim(&self, name: &str, value: &Value) -> &Self {
        let claims = claims(self);

        assert_eq!(
            claims.extra.get(name),
            Some(value),
            "Claim '{}' mismatch. Available claims: {:?}",
            name,
            claims.extra.keys().collect::<Vec<_>>()
        );

        self
    }
}
