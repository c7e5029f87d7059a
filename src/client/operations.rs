use bytes::Bytes;

use crate::{
    cell::Cell,
    store::{DeleteTarget, LATEST_TIMESTAMP, MutationKind, ReadSpec, RowMutation, TimeRange},
    util::{Result, Status, to_bytes},
};

/// Cells to write to one row
///
/// # Example
///
/// ```
/// use cellstore::Put;
///
/// let mut put = Put::new("p001");
/// put.add_column("base_info", "brand", "Apple")
///     .add_column("base_info", "name", "iPhone");
/// assert_eq!(put.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Put {
    row: Bytes,
    cells: Vec<Cell>,
}

impl Put {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Put {
            row: to_bytes(row),
            cells: Vec::new(),
        }
    }

    /// Add a cell stamped by the store when the put is applied
    pub fn add_column(
        &mut self,
        family: impl AsRef<[u8]>,
        qualifier: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.add_column_at(family, qualifier, LATEST_TIMESTAMP, value)
    }

    /// Add a cell at an explicit timestamp
    ///
    /// `u64::MAX` is [`LATEST_TIMESTAMP`]: the store stamps such a cell just
    /// like one added with [`Put::add_column`].
    pub fn add_column_at(
        &mut self,
        family: impl AsRef<[u8]>,
        qualifier: impl AsRef<[u8]>,
        timestamp: u64,
        value: impl AsRef<[u8]>,
    ) -> &mut Self {
        self.cells.push(Cell::put(
            self.row.clone(),
            to_bytes(family),
            to_bytes(qualifier),
            timestamp,
            to_bytes(value),
        ));
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn into_mutation(self) -> RowMutation {
        RowMutation {
            row: self.row,
            kind: MutationKind::Put(self.cells),
        }
    }
}

/// Single-row read
#[derive(Debug, Clone)]
pub struct Get {
    row: Bytes,
    spec: ReadSpec,
}

impl Get {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Get {
            row: to_bytes(row),
            spec: ReadSpec::default(),
        }
    }

    pub fn add_family(&mut self, family: impl AsRef<[u8]>) -> &mut Self {
        self.spec.columns.add_family(to_bytes(family));
        self
    }

    pub fn add_column(&mut self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> &mut Self {
        self.spec
            .columns
            .add_column(to_bytes(family), to_bytes(qualifier));
        self
    }

    /// Versions per column to return, capped by each family's maximum
    pub fn read_versions(&mut self, versions: u32) -> &mut Self {
        self.spec.max_versions = versions;
        self
    }

    /// Only versions with `min <= timestamp < max`
    pub fn set_time_range(&mut self, min: u64, max: u64) -> Result<&mut Self> {
        self.spec.time_range = time_range(min, max)?;
        Ok(self)
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub(crate) fn spec(&self) -> &ReadSpec {
        &self.spec
    }
}

/// Ordered range read over `[start_row, stop_row)`
///
/// Empty start and stop rows mean the table's first and last row.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    start_row: Bytes,
    stop_row: Bytes,
    spec: ReadSpec,
    caching: Option<usize>,
    limit: Option<usize>,
}

impl Scan {
    pub fn new() -> Self {
        Scan::default()
    }

    pub fn with_start_row(mut self, row: impl AsRef<[u8]>) -> Self {
        self.start_row = to_bytes(row);
        self
    }

    pub fn with_stop_row(mut self, row: impl AsRef<[u8]>) -> Self {
        self.stop_row = to_bytes(row);
        self
    }

    pub fn add_family(&mut self, family: impl AsRef<[u8]>) -> &mut Self {
        self.spec.columns.add_family(to_bytes(family));
        self
    }

    pub fn add_column(&mut self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> &mut Self {
        self.spec
            .columns
            .add_column(to_bytes(family), to_bytes(qualifier));
        self
    }

    pub fn read_versions(&mut self, versions: u32) -> &mut Self {
        self.spec.max_versions = versions;
        self
    }

    pub fn set_time_range(&mut self, min: u64, max: u64) -> Result<&mut Self> {
        self.spec.time_range = time_range(min, max)?;
        Ok(self)
    }

    /// Rows fetched per batch; overrides `cellstore.client.scanner.caching`
    pub fn set_caching(&mut self, rows: usize) -> &mut Self {
        self.caching = Some(rows.max(1));
        self
    }

    /// Stop after this many rows
    pub fn set_limit(&mut self, rows: usize) -> &mut Self {
        self.limit = Some(rows);
        self
    }

    pub fn start_row(&self) -> &Bytes {
        &self.start_row
    }

    pub fn stop_row(&self) -> &Bytes {
        &self.stop_row
    }

    pub fn caching(&self) -> Option<usize> {
        self.caching
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub(crate) fn spec(&self) -> &ReadSpec {
        &self.spec
    }
}

fn time_range(min: u64, max: u64) -> Result<TimeRange> {
    if min > max {
        return Err(Status::invalid_argument(format!(
            "Time range start {min} is after end {max}"
        )));
    }
    Ok(TimeRange { min, max })
}

/// Removal of some or all of one row
///
/// With nothing added the whole row is deleted.
#[derive(Debug, Clone)]
pub struct Delete {
    row: Bytes,
    targets: Vec<DeleteTarget>,
}

impl Delete {
    pub fn new(row: impl AsRef<[u8]>) -> Self {
        Delete {
            row: to_bytes(row),
            targets: Vec::new(),
        }
    }

    /// Every version of every column in `family`
    pub fn add_family(&mut self, family: impl AsRef<[u8]>) -> &mut Self {
        self.targets.push(DeleteTarget::Family(to_bytes(family)));
        self
    }

    /// Every version of `family:qualifier`
    pub fn add_columns(&mut self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> &mut Self {
        self.targets.push(DeleteTarget::Column {
            family: to_bytes(family),
            qualifier: to_bytes(qualifier),
        });
        self
    }

    /// The newest version of `family:qualifier` only
    pub fn add_column(&mut self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> &mut Self {
        self.targets.push(DeleteTarget::LatestVersion {
            family: to_bytes(family),
            qualifier: to_bytes(qualifier),
        });
        self
    }

    /// The version of `family:qualifier` written at `timestamp`
    pub fn add_column_at(
        &mut self,
        family: impl AsRef<[u8]>,
        qualifier: impl AsRef<[u8]>,
        timestamp: u64,
    ) -> &mut Self {
        self.targets.push(DeleteTarget::Version {
            family: to_bytes(family),
            qualifier: to_bytes(qualifier),
            timestamp,
        });
        self
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn targets(&self) -> &[DeleteTarget] {
        &self.targets
    }

    pub(crate) fn into_mutation(self) -> RowMutation {
        let targets = if self.targets.is_empty() {
            vec![DeleteTarget::Row]
        } else {
            self.targets
        };
        RowMutation {
            row: self.row,
            kind: MutationKind::Delete(targets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_cells_share_row() {
        let mut put = Put::new("p001");
        put.add_column("base_info", "brand", "Apple")
            .add_column_at("extra_info", "price", 7, "5999");

        assert_eq!(put.len(), 2);
        assert!(put.cells().iter().all(|c| c.row().as_ref() == b"p001"));
        assert_eq!(put.cells()[0].timestamp(), LATEST_TIMESTAMP);
        assert_eq!(put.cells()[1].timestamp(), 7);
    }

    #[test]
    fn test_empty_delete_is_row_delete() {
        let mutation = Delete::new("p001").into_mutation();
        assert_eq!(mutation.kind, MutationKind::Delete(vec![DeleteTarget::Row]));

        let mut delete = Delete::new("p001");
        delete.add_column("base_info", "name");
        match delete.into_mutation().kind {
            MutationKind::Delete(targets) => {
                assert!(matches!(targets[0], DeleteTarget::LatestVersion { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_time_range_bounds() {
        let mut get = Get::new("r");
        assert!(get.set_time_range(5, 1).is_err());
        get.set_time_range(1, 5).unwrap();
        assert!(get.spec().time_range.contains(1));
        assert!(!get.spec().time_range.contains(5));
    }

    #[test]
    fn test_scan_defaults() {
        let mut scan = Scan::new().with_start_row("a");
        scan.set_caching(0);
        assert_eq!(scan.start_row().as_ref(), b"a");
        assert!(scan.stop_row().is_empty());
        assert_eq!(scan.caching(), Some(1));
        assert_eq!(scan.limit(), None);
    }
}
