#![no_main]

use japikey::KeySet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    // Anything accepted must encode back to a document that decodes to the same key-set
    if let Ok(key_set) = KeySet::from_json(json) {
        let encoded = key_set.to_json().expect("encoding a decoded key set");
        let decoded = KeySet::from_json(&encoded).expect("re-decoding an encoded key set");
        assert_eq!(decoded, key_set);
    }
});
