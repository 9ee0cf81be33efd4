#![no_main]

use coded_errors::Error;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(err) = Error::from_json_slice(data) else {
        return;
    };

    // Anything accepted must render and re-encode.
    let _ = err.to_string();
    let _ = err.http_status();
    if let Ok(encoded) = err.to_json() {
        let again = Error::from_json(&encoded).expect("re-encoded error must decode");
        assert_eq!(again.code(), err.code());
        assert_eq!(again.message(), err.message());
    }
});
