#![no_main]

use libfuzzer_sys::fuzz_target;
use reword::settings::Settings;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let first = Settings::from_toml_str(text);
        let second = Settings::from_toml_str(text);
        match (first, second) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => panic!("parsing is not deterministic"),
        }
    }
});
