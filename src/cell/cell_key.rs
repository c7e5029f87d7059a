//! Order-preserving encoding of cell coordinates
//!
//! ```text
//! +----------+-------------+----------------+------------+-----------+------+
//! | esc(row) | esc(family) | esc(qualifier) | !timestamp | !sequence | type |
//! +----------+-------------+----------------+------------+-----------+------+
//!                                             8 bytes BE   8 bytes BE  1 byte
//! ```
//!
//! `esc` writes every `0x00` as `0x00 0xFF` and terminates the component
//! with `0x00 0x01`, so byte-wise comparison of encoded keys orders cells by
//! row, family, qualifier exactly as the raw byte strings compare, and no
//! encoded row is a prefix of another. Timestamp and sequence are stored
//! inverted so the newest version of a column sorts first.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    cell::{Cell, CellType},
    util::{Result, Status},
};

const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;

/// Fixed suffix: timestamp(8) + sequence(8) + type(1)
const SUFFIX_SIZE: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellKey {
    pub row: Bytes,
    pub family: Bytes,
    pub qualifier: Bytes,
    pub timestamp: u64,
    pub sequence: u64,
    pub cell_type: CellType,
}

impl CellKey {
    pub fn of(cell: &Cell, sequence: u64) -> Self {
        CellKey {
            row: cell.row().clone(),
            family: cell.family().clone(),
            qualifier: cell.qualifier().clone(),
            timestamp: cell.timestamp(),
            sequence,
            cell_type: cell.cell_type(),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            self.row.len() + self.family.len() + self.qualifier.len() + 6 + SUFFIX_SIZE,
        );
        put_escaped(&mut buf, &self.row);
        put_escaped(&mut buf, &self.family);
        put_escaped(&mut buf, &self.qualifier);
        buf.put_u64(u64::MAX - self.timestamp);
        buf.put_u64(u64::MAX - self.sequence);
        buf.put_u8(self.cell_type as u8);
        buf.freeze()
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let (row, rest) = take_escaped(data)?;
        let (family, rest) = take_escaped(rest)?;
        let (qualifier, rest) = take_escaped(rest)?;
        if rest.len() != SUFFIX_SIZE {
            return Err(Status::corruption("Bad cell key suffix length"));
        }

        let timestamp = u64::MAX - u64::from_be_bytes(fixed8(&rest[0..8]));
        let sequence = u64::MAX - u64::from_be_bytes(fixed8(&rest[8..16]));
        let cell_type = CellType::from_u8(rest[16])
            .ok_or_else(|| Status::corruption(format!("Unknown cell type {}", rest[16])))?;

        Ok(CellKey {
            row,
            family,
            qualifier,
            timestamp,
            sequence,
            cell_type,
        })
    }

    /// Encoded prefix shared by every cell of `row`
    pub fn row_prefix(row: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(row.len() + 2);
        put_escaped(&mut buf, row);
        buf.freeze()
    }

    pub fn into_cell(self, value: Bytes) -> Cell {
        Cell::new(
            self.row,
            self.family,
            self.qualifier,
            self.timestamp,
            self.cell_type,
            value,
        )
    }
}

fn fixed8(data: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(data);
    out
}

fn put_escaped(buf: &mut BytesMut, data: &[u8]) {
    for &b in data {
        if b == ESCAPE {
            buf.put_u8(ESCAPE);
            buf.put_u8(ESCAPED_ZERO);
        } else {
            buf.put_u8(b);
        }
    }
    buf.put_u8(ESCAPE);
    buf.put_u8(TERMINATOR);
}

fn take_escaped(data: &[u8]) -> Result<(Bytes, &[u8])> {
    let mut out = BytesMut::new();
    let mut i = 0;
    while i < data.len() {
        if data[i] != ESCAPE {
            out.put_u8(data[i]);
            i += 1;
            continue;
        }
        match data.get(i + 1) {
            Some(&ESCAPED_ZERO) => {
                out.put_u8(ESCAPE);
                i += 2;
            }
            Some(&TERMINATOR) => return Ok((out.freeze(), &data[i + 2..])),
            _ => return Err(Status::corruption("Bad escape in cell key")),
        }
    }
    Err(Status::corruption("Unterminated cell key component"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(row: &[u8], family: &[u8], qualifier: &[u8], ts: u64, seq: u64) -> CellKey {
        CellKey {
            row: Bytes::copy_from_slice(row),
            family: Bytes::copy_from_slice(family),
            qualifier: Bytes::copy_from_slice(qualifier),
            timestamp: ts,
            sequence: seq,
            cell_type: CellType::Put,
        }
    }

    #[test]
    fn test_encode_decode() {
        let k = key(b"p\x00001", b"base_info", b"", 123, 7);
        let decoded = CellKey::decode(&k.encode()).unwrap();
        assert_eq!(decoded, k);
    }

    #[test]
    fn test_newest_version_sorts_first() {
        let old = key(b"p001", b"f", b"q", 100, 1).encode();
        let new = key(b"p001", b"f", b"q", 200, 2).encode();
        assert!(new < old);

        let same_ts_later = key(b"p001", b"f", b"q", 100, 9).encode();
        assert!(same_ts_later < old);
    }

    #[test]
    fn test_row_order_preserved() {
        let a = key(b"p001", b"z", b"z", 1, 1).encode();
        let b = key(b"p0010", b"a", b"a", 1, 1).encode();
        let c = key(b"p001\x00", b"a", b"a", 1, 1).encode();
        assert!(a < c);
        assert!(c < b);
    }

    #[test]
    fn test_row_prefix() {
        let k = key(b"p001", b"base_info", b"brand", 1, 1).encode();
        assert!(k.starts_with(&CellKey::row_prefix(b"p001")));
        assert!(!k.starts_with(&CellKey::row_prefix(b"p00")));
    }

    #[test]
    fn test_decode_corrupt() {
        assert!(CellKey::decode(b"abc").unwrap_err().is_corruption());
        let mut bad = key(b"r", b"f", b"q", 1, 1).encode().to_vec();
        bad.pop();
        assert!(CellKey::decode(&bad).is_err());
    }
}
