use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use bytes::Bytes;

use crate::{
    cell::{Cell, CellType},
    memstore::StoredCell,
    schema::{ColumnFamilyDescriptor, TableDescriptor},
};

/// Half-open timestamp interval `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub min: u64,
    pub max: u64,
}

impl TimeRange {
    pub const ALL: TimeRange = TimeRange {
        min: 0,
        max: u64::MAX,
    };

    #[inline]
    pub fn contains(&self, ts: u64) -> bool {
        ts >= self.min && ts < self.max
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::ALL
    }
}

/// Which columns a read returns
///
/// Empty means every family. A family mapped to `None` means every
/// qualifier of that family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    families: BTreeMap<Bytes, Option<BTreeSet<Bytes>>>,
}

impl ColumnFilter {
    pub fn add_family(&mut self, family: Bytes) {
        self.families.insert(family, None);
    }

    pub fn add_column(&mut self, family: Bytes, qualifier: Bytes) {
        // A family selected as a whole stays whole
        if let Some(qualifiers) = self
            .families
            .entry(family)
            .or_insert_with(|| Some(BTreeSet::new()))
        {
            qualifiers.insert(qualifier);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &Bytes> {
        self.families.keys()
    }

    pub fn matches(&self, family: &[u8], qualifier: &[u8]) -> bool {
        if self.families.is_empty() {
            return true;
        }
        match self.families.get(family) {
            None => false,
            Some(None) => true,
            Some(Some(qualifiers)) => qualifiers.contains(qualifier),
        }
    }
}

/// Everything a point read or a scan needs to decide which cells to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSpec {
    pub columns: ColumnFilter,
    pub max_versions: u32,
    pub time_range: TimeRange,
}

impl Default for ReadSpec {
    fn default() -> Self {
        ReadSpec {
            columns: ColumnFilter::default(),
            max_versions: 1,
            time_range: TimeRange::ALL,
        }
    }
}

/// Delete markers of one row, indexed for masking
#[derive(Default)]
struct Markers<'a> {
    family: HashMap<&'a [u8], u64>,
    column: HashMap<(&'a [u8], &'a [u8]), u64>,
    version: HashSet<(&'a [u8], &'a [u8], u64)>,
}

impl<'a> Markers<'a> {
    fn collect(stored: &'a [StoredCell]) -> Self {
        let mut markers = Markers::default();
        for StoredCell { cell, .. } in stored {
            let (f, q, ts) = (cell.family().as_ref(), cell.qualifier().as_ref(), cell.timestamp());
            match cell.cell_type() {
                CellType::Put => {}
                CellType::Delete => {
                    markers.version.insert((f, q, ts));
                }
                CellType::DeleteColumn => {
                    let e = markers.column.entry((f, q)).or_insert(ts);
                    *e = (*e).max(ts);
                }
                CellType::DeleteFamily => {
                    let e = markers.family.entry(f).or_insert(ts);
                    *e = (*e).max(ts);
                }
            }
        }
        markers
    }

    fn masks(&self, cell: &'a Cell) -> bool {
        let (f, q, ts) = (cell.family().as_ref(), cell.qualifier().as_ref(), cell.timestamp());
        self.family.get(f).is_some_and(|&m| ts <= m)
            || self.column.get(&(f, q)).is_some_and(|&m| ts <= m)
            || self.version.contains(&(f, q, ts))
    }
}

/// Walks the live versions of each column of a row, newest first
///
/// Calls `emit(cf, index, cell)` for every put that is not masked by a
/// delete marker and is not an older write at an already-seen timestamp.
/// `index` counts live versions of the column so far.
fn for_each_live_version<'a>(
    stored: &'a [StoredCell],
    desc: &'a TableDescriptor,
    mut emit: impl FnMut(&'a ColumnFamilyDescriptor, usize, &'a StoredCell),
) {
    let markers = Markers::collect(stored);

    let mut current: Option<(&[u8], &[u8])> = None;
    let mut last_ts = None;
    let mut index = 0;

    for entry in stored {
        let cell = &entry.cell;
        if cell.is_delete() || markers.masks(cell) {
            continue;
        }
        let Some(cf) = desc.family(cell.family()) else {
            continue;
        };

        let column = (cell.family().as_ref(), cell.qualifier().as_ref());
        if current != Some(column) {
            current = Some(column);
            last_ts = None;
            index = 0;
        }
        if last_ts == Some(cell.timestamp()) {
            continue;
        }
        last_ts = Some(cell.timestamp());

        emit(cf, index, entry);
        index += 1;
    }
}

/// Version `index` of a column survives retention at `now_ms`
fn retained(cf: &ColumnFamilyDescriptor, index: usize, ts: u64, now_ms: u64) -> bool {
    if index >= cf.max_versions() as usize {
        return false;
    }
    let expired = cf.ttl_cutoff(now_ms).is_some_and(|cutoff| ts < cutoff);
    !expired || index < cf.min_versions() as usize
}

/// Cells of one row a read returns, sorted by family, qualifier and newest
/// version first
pub(crate) fn visible_cells(
    stored: &[StoredCell],
    desc: &TableDescriptor,
    spec: &ReadSpec,
    now_ms: u64,
) -> Vec<Cell> {
    let mut out = Vec::new();
    let mut returned: HashMap<(&[u8], &[u8]), u32> = HashMap::new();

    for_each_live_version(stored, desc, |cf, index, entry| {
        let cell = &entry.cell;
        if !spec.columns.matches(cell.family(), cell.qualifier())
            || !retained(cf, index, cell.timestamp(), now_ms)
            || !spec.time_range.contains(cell.timestamp())
        {
            return;
        }
        let n = returned
            .entry((cell.family().as_ref(), cell.qualifier().as_ref()))
            .or_insert(0);
        if *n < spec.max_versions {
            *n += 1;
            out.push(cell.clone());
        }
    });

    out
}

/// Entries of one row that survive compaction
///
/// Drops versions beyond retention, masked puts and the delete markers
/// themselves, except in families that keep deleted cells, where every
/// entry is kept.
pub(crate) fn retained_entries(
    stored: &[StoredCell],
    desc: &TableDescriptor,
    now_ms: u64,
) -> Vec<StoredCell> {
    let mut keep: HashSet<(u64, &[u8], &[u8], u64)> = HashSet::new();
    for_each_live_version(stored, desc, |cf, index, entry| {
        if retained(cf, index, entry.cell.timestamp(), now_ms) {
            keep.insert(identity(entry));
        }
    });

    stored
        .iter()
        .filter(|entry| match desc.family(entry.cell.family()) {
            None => false,
            Some(cf) if cf.keep_deleted_cells() => true,
            Some(_) => keep.contains(&identity(entry)),
        })
        .cloned()
        .collect()
}

fn identity(entry: &StoredCell) -> (u64, &[u8], &[u8], u64) {
    (
        entry.sequence,
        entry.cell.family().as_ref(),
        entry.cell.qualifier().as_ref(),
        entry.cell.timestamp(),
    )
}
