#![no_main]

use libfuzzer_sys::fuzz_target;
use reword_git::repo::shell_quote;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        let quoted = shell_quote(value);
        assert!(quoted.len() >= 2);
        let inner = &quoted[1..quoted.len() - 1];
        assert_eq!(inner.replace(r"'\''", "'"), value);
    }
});
