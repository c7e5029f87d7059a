//! WAL file format
//!
//! A WAL file is a sequence of 32KB blocks. A logical record is split into
//! one or more fragments so that no fragment crosses a block boundary. A
//! block tail too short for a header is zero-filled.
//!
//! Fragment format:
//! +----------+--------+-------+--------+
//! | Checksum | Length | Type  | Data   |
//! +----------+--------+-------+--------+
//! | 4 bytes  | 2 bytes| 1 byte| N bytes|
//! +----------+--------+-------+--------+
//!
//! The checksum is CRC32 over the type byte followed by the data, stored
//! little-endian like the length.

use crc32fast::Hasher;

pub const BLOCK_SIZE: usize = 32 * 1024;

/// checksum(4) + length(2) + type(1)
pub const HEADER_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    /// Whole record in one fragment
    Full = 1,
    First = 2,
    Middle = 3,
    Last = 4,
}

impl RecordType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(RecordType::Full),
            2 => Some(RecordType::First),
            3 => Some(RecordType::Middle),
            4 => Some(RecordType::Last),
            _ => None,
        }
    }

    /// Pick the fragment type from its position in the record
    pub fn for_fragment(is_first: bool, is_last: bool) -> Self {
        match (is_first, is_last) {
            (true, true) => RecordType::Full,
            (true, false) => RecordType::First,
            (false, true) => RecordType::Last,
            (false, false) => RecordType::Middle,
        }
    }
}

pub fn checksum(record_type: RecordType, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[record_type as u8]);
    hasher.update(data);
    hasher.finalize()
}

pub fn encode_header(record_type: RecordType, data: &[u8]) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&checksum(record_type, data).to_le_bytes());
    header[4..6].copy_from_slice(&(data.len() as u16).to_le_bytes());
    header[6] = record_type as u8;
    header
}

/// Header fields: (checksum, length, raw type byte)
///
/// The type byte is returned raw so the reader can tell zero padding
/// (type 0) from a damaged header.
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> (u32, u16, u8) {
    let checksum = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length = u16::from_le_bytes([header[4], header[5]]);
    (checksum, length, header[6])
}
