use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::warn;

use crate::util::{Result, Status};
use crate::wal::log_format::{BLOCK_SIZE, HEADER_SIZE, RecordType, checksum, decode_header};

/// Reads logical records back from a log
///
/// A log that ends in the middle of a fragment (the process died while
/// appending) is treated as ending before that record. Damage anywhere else
/// is reported as corruption.
pub struct Reader<R: Read = BufReader<File>> {
    src: R,
    /// Bytes consumed so far
    offset: u64,
    /// End of the last complete record
    valid_len: u64,
    record: Vec<u8>,
}

impl Reader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| Status::io_error(format!("Failed to open WAL file: {e}")))?;
        Ok(Reader::new(BufReader::new(file)))
    }
}

/// Outcome of reading one fragment
enum Fragment {
    Data(RecordType, Vec<u8>),
    /// Clean end of log
    Eof,
    /// Log ends inside a fragment
    Torn,
}

impl<R: Read> Reader<R> {
    pub fn new(src: R) -> Self {
        Reader {
            src,
            offset: 0,
            valid_len: 0,
            record: Vec::new(),
        }
    }

    /// Next logical record, or `None` at the end of the log
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        self.record.clear();
        let mut in_record = false;
        let record_start = self.offset;

        loop {
            let (record_type, data) = match self.read_fragment()? {
                Fragment::Data(t, d) => (t, d),
                Fragment::Eof if !in_record => return Ok(None),
                Fragment::Eof | Fragment::Torn => {
                    warn!(
                        offset = record_start,
                        "WAL ends inside a record, ignoring the incomplete tail"
                    );
                    return Ok(None);
                }
            };

            match (record_type, in_record) {
                (RecordType::Full, false) => {
                    self.valid_len = self.offset;
                    return Ok(Some(data));
                }
                (RecordType::First, false) => {
                    self.record = data;
                    in_record = true;
                }
                (RecordType::Middle, true) => self.record.extend_from_slice(&data),
                (RecordType::Last, true) => {
                    self.record.extend_from_slice(&data);
                    self.valid_len = self.offset;
                    return Ok(Some(std::mem::take(&mut self.record)));
                }
                (t, _) => {
                    return Err(Status::corruption(format!(
                        "Unexpected {t:?} fragment at offset {}",
                        self.offset
                    )));
                }
            }
        }
    }

    fn read_fragment(&mut self) -> Result<Fragment> {
        let left_in_block = BLOCK_SIZE - (self.offset % BLOCK_SIZE as u64) as usize;
        if left_in_block < HEADER_SIZE {
            let mut padding = [0u8; HEADER_SIZE];
            let n = self.fill(&mut padding[..left_in_block])?;
            if n < left_in_block {
                return Ok(Fragment::Eof);
            }
        }

        let mut header = [0u8; HEADER_SIZE];
        match self.fill(&mut header)? {
            0 => return Ok(Fragment::Eof),
            HEADER_SIZE => {}
            _ => return Ok(Fragment::Torn),
        }

        let (expected, length, type_byte) = decode_header(&header);
        let record_type = RecordType::from_u8(type_byte).ok_or_else(|| {
            Status::corruption(format!(
                "Bad fragment type {type_byte} at offset {}",
                self.offset - HEADER_SIZE as u64
            ))
        })?;

        let mut data = vec![0u8; length as usize];
        if self.fill(&mut data)? < data.len() {
            return Ok(Fragment::Torn);
        }

        let actual = checksum(record_type, &data);
        if actual != expected {
            return Err(Status::corruption(format!(
                "Checksum mismatch at offset {}: expected {expected}, got {actual}",
                self.offset - data.len() as u64 - HEADER_SIZE as u64
            )));
        }

        Ok(Fragment::Data(record_type, data))
    }

    /// Read until `buf` is full or the source is exhausted
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.src.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Status::io_error(format!("WAL read failed: {e}"))),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }

    /// Length of the log prefix holding only complete records
    ///
    /// Appending after a torn tail must start here, or the next reader
    /// would see the torn bytes as a damaged record.
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
