#![no_main]

use cellstore::wal::WalEdit;
use libfuzzer_sys::fuzz_target;

// Decoding arbitrary payloads must return an error, never panic, and
// whatever decodes must encode back to something that decodes the same.
fuzz_target!(|data: &[u8]| {
    if let Ok(edit) = WalEdit::decode(data) {
        let encoded = edit.encode().expect("decoded edit must encode");
        assert_eq!(WalEdit::decode(&encoded).expect("re-decode"), edit);
    }
});
