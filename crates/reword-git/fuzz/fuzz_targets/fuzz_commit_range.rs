#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use reword_git::CommitRange;

fuzz_target!(|data: &[u8]| {
    let refs: Vec<String> = data.chunks(2).map(|c| format!("{c:02x?}")).collect();
    let range = CommitRange::new(refs.clone());
    let unique: HashSet<_> = range.iter().collect();
    assert_eq!(unique.len(), range.len());
    assert!(range.len() <= refs.len());
});
