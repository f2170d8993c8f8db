#![no_main]

use japikey::{should_verify, verify, KeyId, PublicKeyMaterial, VerificationConfig};
use libfuzzer_sys::fuzz_target;
use rsa::{BigUint, RsaPublicKey};
use std::time::Duration;

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = VerificationConfig::new("https://fuzz.example.com") else {
        return;
    };
    // Small fixed key: any kid resolves, so inputs reach the signature stage
    let Ok(key) = RsaPublicKey::new(BigUint::from(3233u32), BigUint::from(17u32)) else {
        return;
    };
    let resolver = |kid: &KeyId, _: Duration| PublicKeyMaterial::new(key.clone(), *kid);

    // Must never panic
    let _ = should_verify(token, &config);
    let _ = verify(token, &config, &resolver);
});
