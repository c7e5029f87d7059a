use std::iter::Peekable;

use bytes::Bytes;
use crossbeam_skiplist::map::Entry;

use crate::{
    cell::CellKey,
    memstore::StoredCell,
    util::Result,
};

type Entries<'a> = Box<dyn Iterator<Item = Entry<'a, Bytes, Bytes>> + 'a>;

/// Groups consecutive memstore entries into rows
///
/// Each item is a row key with all of its stored entries (puts and delete
/// markers) in key order. The iterator is lazy: it only walks the skip list
/// as far as the caller consumes rows. After a decoding error it yields
/// nothing more.
pub struct RowIter<'a> {
    entries: Peekable<Entries<'a>>,
    failed: bool,
}

impl<'a> RowIter<'a> {
    pub(crate) fn new(entries: impl Iterator<Item = Entry<'a, Bytes, Bytes>> + 'a) -> Self {
        let entries: Entries<'a> = Box::new(entries);
        RowIter {
            entries: entries.peekable(),
            failed: false,
        }
    }

    fn next_row(&mut self) -> Result<Option<(Bytes, Vec<StoredCell>)>> {
        let first = match self.entries.next() {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let key = CellKey::decode(first.key())?;
        let row = key.row.clone();
        let mut cells = vec![StoredCell {
            sequence: key.sequence,
            cell: key.into_cell(first.value().clone()),
        }];

        while let Some(entry) = self.entries.peek() {
            let key = CellKey::decode(entry.key())?;
            if key.row != row {
                break;
            }
            let value = entry.value().clone();
            self.entries.next();
            cells.push(StoredCell {
                sequence: key.sequence,
                cell: key.into_cell(value),
            });
        }

        Ok(Some((row, cells)))
    }
}

impl Iterator for RowIter<'_> {
    type Item = Result<(Bytes, Vec<StoredCell>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_row() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
