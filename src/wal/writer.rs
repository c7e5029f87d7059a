use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::util::{Result, Status};
use crate::wal::log_format::{BLOCK_SIZE, HEADER_SIZE, RecordType, encode_header};

/// Appends framed records to a log
///
/// Generic over the destination so the framing can be exercised against an
/// in-memory buffer; the store always writes to a [`File`].
pub struct Writer<W: Write = File> {
    dest: W,
    /// Bytes in the log, including what existed before this writer
    offset: u64,
    /// Position inside the current block
    block_offset: usize,
    scratch: Vec<u8>,
    /// Set once a write fails; the destination may hold a partial record
    poisoned: bool,
}

impl Writer<File> {
    /// Open `path` for appending, creating it if missing
    ///
    /// Block alignment continues from the current file length, so records
    /// appended after a reopen are framed exactly as if the writer had never
    /// been closed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|e| Status::io_error(format!("Failed to open WAL file: {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| Status::io_error(format!("Failed to stat WAL file: {e}")))?
            .len();

        Ok(Writer::new(file, len))
    }

    pub fn sync(&mut self) -> Result<()> {
        self.dest
            .sync_data()
            .map_err(|e| Status::io_error(format!("Sync failed: {e}")))
    }
}

impl<W: Write> Writer<W> {
    pub fn new(dest: W, offset: u64) -> Self {
        Writer {
            dest,
            offset,
            block_offset: (offset % BLOCK_SIZE as u64) as usize,
            scratch: Vec::new(),
            poisoned: false,
        }
    }

    /// Append one logical record
    ///
    /// All fragments are staged and handed to the destination in a single
    /// write. Offsets only advance once that write succeeds. A failed write
    /// may leave part of the record behind, so the writer refuses further
    /// records; reopening the log drops the partial tail.
    pub fn add_record(&mut self, data: &[u8]) -> Result<()> {
        if self.poisoned {
            return Err(Status::io_error("WAL writer failed earlier; reopen the log"));
        }
        self.scratch.clear();

        let mut block_offset = self.block_offset;
        let mut rest = data;
        let mut first = true;
        loop {
            let leftover = BLOCK_SIZE - block_offset;
            if leftover < HEADER_SIZE {
                self.scratch.resize(self.scratch.len() + leftover, 0);
                block_offset = 0;
            }

            let avail = BLOCK_SIZE - block_offset - HEADER_SIZE;
            let n = rest.len().min(avail);
            let (fragment, tail) = rest.split_at(n);
            let record_type = RecordType::for_fragment(first, tail.is_empty());

            self.scratch
                .extend_from_slice(&encode_header(record_type, fragment));
            self.scratch.extend_from_slice(fragment);
            block_offset += HEADER_SIZE + n;

            rest = tail;
            first = false;
            if rest.is_empty() {
                break;
            }
        }

        if let Err(e) = self.dest.write_all(&self.scratch) {
            self.poisoned = true;
            return Err(Status::io_error(format!("WAL write failed: {e}")));
        }
        self.block_offset = block_offset;
        self.offset += self.scratch.len() as u64;
        Ok(())
    }

    /// Total log size in bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> W {
        self.dest
    }
}
