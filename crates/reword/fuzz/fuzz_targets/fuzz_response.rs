#![no_main]

use libfuzzer_sys::fuzz_target;
use reword::generate::{clean_message, extract_content};

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    if let Ok(content) = extract_content(&body) {
        let cleaned = clean_message(&content, true);
        assert_eq!(cleaned.trim(), cleaned);
        assert!(cleaned.len() <= content.len());
    }
});
