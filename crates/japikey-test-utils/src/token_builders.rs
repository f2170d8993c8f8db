//! Builder patterns for test data construction
//!
//! Provides a fluent API for crafting tokens, including ones a real issuer
//! would never produce (wrong algorithm, mismatched issuer, bad versions).

use crate::crypto_fixtures::{test_hmac_secret, test_key_set, test_private_key_pem};
use crate::test_ids::{TEST_BASE_ISSUER, TEST_KEY_ID_1, TEST_KEY_SEED_1, TEST_SUBJECT_ALICE};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use japikey::jwt::normalize_base_issuer;
use japikey::KeySet;
use jsonwebtoken::{Algorithm, EncodingKey};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Builder for creating signed test tokens
///
/// Defaults produce a token that verifies against
/// `test_key_set(TEST_KEY_SEED_1, TEST_KEY_ID_1)` and
/// `test_verification_config()`.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .with_claim("role", "admin")
///     .expires_in(3600)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    alg: String,
    kid: Option<String>,
    base_issuer: String,
    iss: Option<String>,
    sub: String,
    ver: Option<String>,
    exp: Option<i64>,
    nbf: Option<i64>,
    iat: Option<i64>,
    extra: Map<String, Value>,
    padding: usize,
    key_seed: u8,
    header_extra: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            alg: "RS256".to_string(),
            kid: Some(TEST_KEY_ID_1.to_string()),
            base_issuer: TEST_BASE_ISSUER.to_string(),
            iss: None,
            sub: TEST_SUBJECT_ALICE.to_string(),
            ver: Some("japikey-v1".to_string()),
            exp: Some((now + Duration::seconds(3600)).timestamp()),
            nbf: None,
            iat: Some(now.timestamp()),
            extra: Map::new(),
            padding: 0,
            key_seed: TEST_KEY_SEED_1,
            header_extra: Map::new(),
        }
    }

    /// Set the header algorithm. `HS*` values are HMAC-signed with
    /// `test_hmac_secret()`, `none` produces an empty signature.
    pub fn with_algorithm(mut self, alg: &str) -> Self {
        self.alg = alg.to_string();
        self
    }

    /// Set the `kid` header (and the key id in the derived issuer)
    pub fn with_key_id(mut self, key_id: Uuid) -> Self {
        self.kid = Some(key_id.to_string());
        self
    }

    /// Set the `kid` header to an arbitrary string
    pub fn with_raw_kid(mut self, kid: &str) -> Self {
        self.kid = Some(kid.to_string());
        self
    }

    /// Omit the `kid` header
    pub fn without_kid(mut self) -> Self {
        self.kid = None;
        self
    }

    /// Add (or overwrite) a header member
    pub fn with_header_member(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.header_extra.insert(name.to_string(), value.into());
        self
    }

    /// Set the base issuer the `iss` claim is derived from
    pub fn with_base_issuer(mut self, base_issuer: &str) -> Self {
        self.base_issuer = base_issuer.to_string();
        self
    }

    /// Set the `iss` claim verbatim instead of deriving it
    pub fn with_issuer(mut self, iss: &str) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Set the subject
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the `ver` claim
    pub fn with_version(mut self, ver: &str) -> Self {
        self.ver = Some(ver.to_string());
        self
    }

    /// Omit the `ver` claim
    pub fn without_version(mut self) -> Self {
        self.ver = None;
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Omit the `exp` claim
    pub fn without_expiry(mut self) -> Self {
        self.exp = None;
        self
    }

    /// Set `nbf` in seconds from now
    pub fn not_before_in(mut self, seconds: i64) -> Self {
        self.nbf = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = Some(timestamp);
        self
    }

    /// Omit the `iat` claim
    pub fn without_issued_at(mut self) -> Self {
        self.iat = None;
        self
    }

    /// Add a non-registered claim
    pub fn with_claim(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(name.to_string(), value.into());
        self
    }

    /// Add a `pad` claim of `len` characters to grow the token
    pub fn with_padding(mut self, len: usize) -> Self {
        self.padding = len;
        self
    }

    /// Sign with the fixture key for `seed`
    pub fn signed_with_seed(mut self, seed: u8) -> Self {
        self.key_seed = seed;
        self
    }

    /// The key-set that verifies tokens from this builder's key and kid.
    ///
    /// # Panics
    ///
    /// Panics if the kid is absent or not a UUID.
    pub fn key_set(&self) -> KeySet {
        let kid = self
            .kid
            .as_deref()
            .and_then(|kid| Uuid::parse_str(kid).ok())
            .expect("key_set() needs a UUID kid");
        test_key_set(self.key_seed, kid).expect("fixture key set")
    }

    /// Build the claims as a JSON value
    pub fn build_claims(&self) -> Value {
        let mut claims = self.extra.clone();

        let iss = self.iss.clone().unwrap_or_else(|| {
            format!(
                "{}{}",
                normalize_base_issuer(&self.base_issuer),
                self.kid.as_deref().unwrap_or_default()
            )
        });
        claims.insert("sub".to_string(), json!(self.sub));
        claims.insert("iss".to_string(), json!(iss));
        if let Some(ver) = &self.ver {
            claims.insert("ver".to_string(), json!(ver));
        }
        if let Some(exp) = self.exp {
            claims.insert("exp".to_string(), json!(exp));
        }
        if let Some(nbf) = self.nbf {
            claims.insert("nbf".to_string(), json!(nbf));
        }
        if let Some(iat) = self.iat {
            claims.insert("iat".to_string(), json!(iat));
        }
        if self.padding > 0 {
            claims.insert("pad".to_string(), json!("x".repeat(self.padding)));
        }

        Value::Object(claims)
    }

    /// Build and sign the token
    ///
    /// # Panics
    ///
    /// Panics if signing with the fixture key fails.
    pub fn build(self) -> String {
        let mut header = json!({"alg": self.alg, "typ": "JWT"});
        if let Some(kid) = &self.kid {
            header["kid"] = json!(kid);
        }
        for (name, value) in &self.header_extra {
            header[name.as_str()] = value.clone();
        }

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(self.build_claims().to_string())
        );
        let signature = self.sign(&signing_input);

        format!("{signing_input}.{signature}")
    }

    fn sign(&self, signing_input: &str) -> String {
        if self.alg == "none" {
            return String::new();
        }

        let Ok(algorithm) = self.alg.parse::<Algorithm>() else {
            return URL_SAFE_NO_PAD.encode(b"unsupported-algorithm");
        };

        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                EncodingKey::from_secret(&test_hmac_secret())
            }
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => {
                let pem = test_private_key_pem(self.key_seed).expect("fixture key");
                EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key PEM")
            }
            _ => return URL_SAFE_NO_PAD.encode(b"unsupported-algorithm"),
        };

        jsonwebtoken::crypto::sign(signing_input.as_bytes(), &key, algorithm)
            .expect("Failed to sign test token")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
