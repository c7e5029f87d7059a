use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use crossbeam_skiplist::SkipMap;

use crate::{
    cell::{Cell, CellKey},
    memstore::RowIter,
    util::Result,
};

/// A cell together with the sequence number of the write that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCell {
    pub sequence: u64,
    pub cell: Cell,
}

/// Sorted in-memory store of every cell version of one table
///
/// Keys are [`CellKey`] encodings, so iteration yields cells ordered by
/// row, family, qualifier and then newest version first. Nothing is ever
/// overwritten in place: a new version or a delete marker is a new entry,
/// and obsolete entries only disappear when the store is rebuilt by
/// compaction.
#[derive(Debug)]
pub struct MemStore {
    map: SkipMap<Bytes, Bytes>,
    approximate_memory: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore {
            map: SkipMap::new(),
            approximate_memory: AtomicUsize::new(0),
        }
    }

    pub fn add(&self, sequence: u64, cell: &Cell) {
        let key = CellKey::of(cell, sequence).encode();
        let value = cell.value().clone();

        self.approximate_memory
            .fetch_add(key.len() + value.len(), Ordering::Relaxed);
        self.map.insert(key, value);
    }

    /// All stored entries of one row, in key order
    pub fn row(&self, row: &[u8]) -> Result<Vec<StoredCell>> {
        match self.rows_from(row).next() {
            Some(entry) => {
                let (found, cells) = entry?;
                if found.as_ref() == row {
                    Ok(cells)
                } else {
                    Ok(Vec::new())
                }
            }
            None => Ok(Vec::new()),
        }
    }

    /// Rows with key `>= start`, each with all of its stored entries
    pub fn rows_from(&self, start: &[u8]) -> RowIter<'_> {
        let lower = CellKey::row_prefix(start);
        RowIter::new(
            self.map
                .range::<Bytes, _>((Bound::Included(lower), Bound::Unbounded)),
        )
    }

    /// Drop every entry belonging to `family`
    pub fn remove_family(&self, family: &[u8]) -> Result<usize> {
        let mut removed = 0;
        for entry in self.map.iter() {
            let key = CellKey::decode(entry.key())?;
            if key.family.as_ref() == family {
                self.approximate_memory
                    .fetch_sub(entry.key().len() + entry.value().len(), Ordering::Relaxed);
                entry.remove();
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn clear(&self) {
        self.map.clear();
        self.approximate_memory.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn approximate_memory_usage(&self) -> usize {
        self.approximate_memory.load(Ordering::Relaxed)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}
