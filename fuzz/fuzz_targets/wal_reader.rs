#![no_main]

use std::io::Cursor;

use cellstore::wal::Reader;
use libfuzzer_sys::fuzz_target;

// A damaged log is either corruption or a torn tail; reading it must not
// panic or loop forever.
fuzz_target!(|data: &[u8]| {
    let mut reader = Reader::new(Cursor::new(data.to_vec()));
    while let Ok(Some(_)) = reader.read_record() {}
    assert!(reader.valid_len() <= data.len() as u64);
});
