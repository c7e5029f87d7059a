#![no_main]

use bytes::Bytes;
use cellstore::{CellType, cell::CellKey};
use libfuzzer_sys::fuzz_target;

// Encode/decode of cell keys built from arbitrary bytes, including 0x00 and
// 0xFF which the escaping has to survive. Arbitrary input to decode must
// fail cleanly.
fuzz_target!(|data: &[u8]| {
    let _ = CellKey::decode(data);

    if data.is_empty() {
        return;
    }
    let split = data[0] as usize % data.len();
    let (row, rest) = data[1..].split_at(split.min(data.len() - 1));
    let (family, qualifier) = rest.split_at(rest.len() / 2);

    for &ts in &[0u64, 1, u64::MAX / 2, u64::MAX] {
        for cell_type in [CellType::Put, CellType::Delete, CellType::DeleteFamily] {
            let key = CellKey {
                row: Bytes::copy_from_slice(row),
                family: Bytes::copy_from_slice(family),
                qualifier: Bytes::copy_from_slice(qualifier),
                timestamp: ts,
                sequence: ts / 3,
                cell_type,
            };
            let decoded = CellKey::decode(&key.encode()).expect("valid key must decode");
            assert_eq!(decoded, key);
        }
    }
});
