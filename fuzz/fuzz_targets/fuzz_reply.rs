// SPDX-License-Identifier: PMPL-1.0
#![no_main]

use libfuzzer_sys::fuzz_target;
use receiptwatch::csv_format::to_csv;
use receiptwatch::sanitizer::{extract_json_object, parse_reply};

fuzz_target!(|data: &[u8]| {
    let Ok(reply) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(json) = extract_json_object(reply) {
        assert!(json.starts_with('{') && json.ends_with('}'));
    }

    if let Ok(parsed) = parse_reply(reply) {
        let first = to_csv(&parsed).expect("formatting parsed reply");
        let second = to_csv(&parsed).expect("formatting parsed reply");
        assert_eq!(first, second);
    }
});
