use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// Copy anything byte-like into an owned, cheaply clonable buffer.
#[inline]
pub fn to_bytes(data: impl AsRef<[u8]>) -> Bytes {
    Bytes::copy_from_slice(data.as_ref())
}

/// Smallest row key that sorts strictly after `row`.
///
/// Scanners resume from here so the last row of a batch is never returned
/// twice.
pub fn next_row_key(row: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(row.len() + 1);
    buf.put_slice(row);
    buf.put_u8(0x00);
    buf.freeze()
}

/// Display adapter for raw bytes: UTF-8 text as is, anything else escaped.
pub struct Printable<'a>(pub &'a [u8]);

impl fmt::Display for Printable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => {
                for b in self.0 {
                    if b.is_ascii_graphic() || *b == b' ' {
                        write!(f, "{}", *b as char)?;
                    } else {
                        write!(f, "\\x{b:02X}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Printable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_row_key_sorts_after() {
        let next = next_row_key(b"p001");
        assert!(next.as_ref() > b"p001".as_slice());
        assert!(next.as_ref() < b"p0010".as_slice());
        assert!(next.as_ref() < b"p002".as_slice());
    }

    #[test]
    fn test_printable() {
        assert_eq!(Printable(b"Apple").to_string(), "Apple");
        assert_eq!(Printable(&[0xff, b'a']).to_string(), "\\xFFa");
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(to_bytes("p001"), Bytes::from_static(b"p001"));
        assert_eq!(to_bytes(vec![1u8, 2]), Bytes::from_static(&[1, 2]));
    }
}
