#![no_main]

use coded_errors::ErrorCode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Strict parsing may reject, but must agree with Display when it accepts.
    if let Ok(code) = raw.parse::<ErrorCode>() {
        let reparsed: ErrorCode = code.to_string().parse().expect("display must parse");
        assert_eq!(reparsed, code);
    }

    // Lenient decoding never fails on a JSON string.
    let json = serde_json::to_string(raw).expect("string always encodes");
    let decoded: ErrorCode = serde_json::from_str(&json).expect("lenient decode");
    assert!(decoded.http_error() < 1000);
});
