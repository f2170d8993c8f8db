#![no_main]

use japikey::base64_int;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(value) = base64_int::decode(text) {
        // Encoding is canonical, so it may differ from the input but must decode to the same value
        let encoded = base64_int::encode(&value);
        assert_eq!(base64_int::decode(&encoded).ok(), Some(value));
    }
});
