//! JAPIKey issuance.
//!
//! Every issued token gets its own RSA-2048 key pair. The private key signs
//! exactly one token and is then dropped; the caller publishes the returned
//! [`KeySet`] so verifiers can resolve the public half by key ID.

use crate::claims::RESERVED_CLAIMS;
use crate::error::{JapikeyError, Result};
use crate::jwks::KeySet;
use crate::jwt::expected_issuer;
use crate::types::KeyId;
use crate::version::Version;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};
use std::fmt;
use tracing::instrument;

/// RSA modulus size for generated keys.
pub const KEY_BITS: usize = 2048;

/// Inputs for a new JAPIKey.
#[derive(Clone)]
pub struct IssueConfig {
    /// Owner of the key, placed in `sub`.
    pub subject: String,

    /// Base issuer URL; the key ID is appended to form `iss`.
    pub base_issuer: String,

    /// Optional `aud` value.
    pub audience: Option<String>,

    /// Expiration time; must be in the future.
    pub expires_at: DateTime<Utc>,

    /// Application claims. Reserved claim names are ignored.
    pub claims: Map<String, Value>,
}

impl IssueConfig {
    pub fn new(
        subject: impl Into<String>,
        base_issuer: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            base_issuer: base_issuer.into(),
            audience: None,
            expires_at,
            claims: Map::new(),
        }
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for IssueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueConfig")
            .field("subject", &"[REDACTED]")
            .field("base_issuer", &self.base_issuer)
            .field("audience", &self.audience)
            .field("expires_at", &self.expires_at)
            .field("claims", &self.claims.len())
            .finish()
    }
}

/// A freshly issued token and the key-set that verifies it.
#[derive(Clone)]
pub struct IssuedJapikey {
    /// The signed token. A bearer credential.
    pub token: String,

    /// Key ID shared by the token header, its issuer and the key-set.
    pub key_id: KeyId,

    /// Public key-set to publish for verifiers.
    pub key_set: KeySet,
}

impl fmt::Debug for IssuedJapikey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedJapikey")
            .field("token", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("key_set", &self.key_set)
            .finish()
    }
}

/// Issue a new JAPIKey with a freshly generated key pair.
///
/// # Errors
///
/// - `JapikeyError::Validation` for an empty subject or issuer, or an expiry
///   that is not in the future
/// - `JapikeyError::Internal` if key generation or signing fails
#[instrument(skip_all)]
pub fn issue(config: &IssueConfig) -> Result<IssuedJapikey> {
    let now = Utc::now().timestamp();
    check_config(config, now)?;

    let private_key = RsaPrivateKey::new(&mut OsRng, KEY_BITS).map_err(|e| {
        tracing::error!(target: "japikey.issue", error = %e, "RSA key generation failed");
        JapikeyError::internal("key generation failed")
    })?;
    let key_id = KeyId::new();

    let token = sign_at(config, &private_key, &key_id, now)?;
    let key_set = KeySet::build(RsaPublicKey::from(&private_key), key_id)?;

    tracing::info!(target: "japikey.issue", kid = %key_id, "JAPIKey issued");

    Ok(IssuedJapikey {
        token,
        key_id,
        key_set,
    })
}

/// Sign a JAPIKey with a caller-held private key.
///
/// # Errors
///
/// Same as [`issue`], minus key generation.
pub fn sign(config: &IssueConfig, private_key: &RsaPrivateKey, key_id: &KeyId) -> Result<String> {
    sign_at(config, private_key, key_id, Utc::now().timestamp())
}

fn sign_at(
    config: &IssueConfig,
    private_key: &RsaPrivateKey,
    key_id: &KeyId,
    now: i64,
) -> Result<String> {
    check_config(config, now)?;

    let claims = assemble_claims(config, key_id, now);

    let der = private_key.to_pkcs1_der().map_err(|e| {
        tracing::error!(target: "japikey.issue", error = %e, "Failed to encode private key");
        JapikeyError::internal("signing failed")
    })?;
    let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, &claims, &encoding_key).map_err(|e| {
        tracing::error!(target: "japikey.issue", error = %e, "JWT signing operation failed");
        JapikeyError::internal("signing failed")
    })
}

fn check_config(config: &IssueConfig, now: i64) -> Result<()> {
    if config.subject.is_empty() {
        return Err(JapikeyError::validation("subject must not be empty"));
    }
    if config.base_issuer.is_empty() {
        return Err(JapikeyError::validation("base issuer must not be empty"));
    }
    if config.expires_at.timestamp() <= now {
        return Err(JapikeyError::validation("expiry must be in the future"));
    }
    Ok(())
}

/// Caller claims first, then the reserved claims on top.
fn assemble_claims(config: &IssueConfig, key_id: &KeyId, now: i64) -> Map<String, Value> {
    let mut claims: Map<String, Value> = config
        .claims
        .iter()
        .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    if claims.len() != config.claims.len() {
        tracing::debug!(
            target: "japikey.issue",
            dropped = config.claims.len() - claims.len(),
            "Ignoring caller claims with reserved names"
        );
    }

    claims.insert("sub".to_string(), Value::from(config.subject.clone()));
    claims.insert(
        "iss".to_string(),
        Value::from(expected_issuer(&config.base_issuer, key_id)),
    );
    if let Some(audience) = &config.audience {
        claims.insert("aud".to_string(), Value::from(audience.clone()));
    }
    claims.insert("exp".to_string(), Value::from(config.expires_at.timestamp()));
    claims.insert("iat".to_string(), Value::from(now));
    claims.insert("ver".to_string(), Value::from(Version::current().as_str()));

    claims
}
