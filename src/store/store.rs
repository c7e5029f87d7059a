use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cell::{Cell, CellType};
use crate::config::StoreOptions;
use crate::memstore::{MemStore, StoredCell};
use crate::schema::{ColumnFamilyDescriptor, TableDescriptor, TableName};
use crate::statistics::Statistics;
use crate::store::catalog::Catalog;
use crate::store::mutation::{DeleteTarget, LATEST_TIMESTAMP, MutationKind, RowMutation};
use crate::store::read::{ReadSpec, retained_entries, visible_cells};
use crate::util::{Result, Status};
use crate::wal::{self, WalEdit};

const LOCK_FILE: &str = "LOCK";
const CATALOG_FILE: &str = "catalog.json";
const WAL_FILE: &str = "wal.log";

/// Cells per WAL record when compaction rewrites the log
const COMPACTION_CHUNK: usize = 1024;

/// One row returned by a scan batch
pub type ScannedRow = (Bytes, Vec<Cell>);

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serialised write-side state
///
/// Held for writing by every mutation and schema change, and for reading by
/// every read, so readers never observe half of a batch.
struct WriteState {
    wal: wal::Writer,
    next_sequence: u64,
    last_timestamp: u64,
}

impl WriteState {
    /// Strictly increasing wall-clock timestamp for the next batch
    fn next_timestamp(&mut self) -> u64 {
        let ts = now_ms().max(self.last_timestamp.saturating_add(1));
        self.last_timestamp = ts;
        ts
    }

    fn log(&mut self, edit: &WalEdit, sync: bool, stats: &Statistics) -> Result<()> {
        let record = edit.encode()?;
        self.wal.add_record(&record)?;
        stats.record_wal_write(record.len() as u64);
        if sync {
            self.wal.sync()?;
            stats.record_wal_sync();
        }
        Ok(())
    }
}

/// Exclusive ownership of a store directory
///
/// An OS file lock on `LOCK`. The file itself stays behind; the lock goes
/// away when the handle is closed, including when the process dies.
struct DirLock {
    _file: File,
}

impl DirLock {
    fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Status::io_error(format!("Failed to open {}: {e}", path.display())))?;
        file.try_lock_exclusive().map_err(|_| {
            Status::busy(format!(
                "{} is locked by another connection",
                root.display()
            ))
        })?;
        Ok(DirLock { _file: file })
    }
}

/// Embedded column-family table store
///
/// Owns one directory: a catalog snapshot, a write-ahead log and a lock
/// file. Every table's cells live in a [`MemStore`]; the WAL is the only
/// durable copy of the data and is replayed on open.
///
/// # Lifecycle
///
/// ```text
/// open → lock dir → load catalog.json → replay wal.log → serve
///                                                          ↓
///                      unlock ← compact wal (if large) ← close
/// ```
pub struct Store {
    root: PathBuf,
    options: StoreOptions,
    catalog: RwLock<Catalog>,
    writer: RwLock<WriteState>,
    statistics: Arc<Statistics>,
    lock: Mutex<Option<DirLock>>,
    closed: AtomicBool,
}

impl Store {
    pub fn open<P: AsRef<Path>>(root: P, options: StoreOptions) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            Status::io_error(format!("Failed to create {}: {e}", root.display()))
        })?;

        let lock = DirLock::acquire(&root)?;
        let statistics = Arc::new(Statistics::new());

        let mut catalog = Catalog::load(&root.join(CATALOG_FILE))?;
        let (next_sequence, last_timestamp) =
            Self::replay_wal(&root.join(WAL_FILE), &mut catalog, &statistics)?;

        let wal = wal::Writer::open(root.join(WAL_FILE))?;
        statistics.set_memstore_bytes(catalog.memstore_bytes());
        info!(
            root = %root.display(),
            tables = catalog.names().len(),
            wal_bytes = wal.offset(),
            "Opened store"
        );

        Ok(Store {
            root,
            options,
            catalog: RwLock::new(catalog),
            writer: RwLock::new(WriteState {
                wal,
                next_sequence,
                last_timestamp,
            }),
            statistics,
            lock: Mutex::new(Some(lock)),
            closed: AtomicBool::new(false),
        })
    }

    /// Rebuild memstores from the log
    ///
    /// Returns the next free sequence number and the largest timestamp seen.
    fn replay_wal(path: &Path, catalog: &mut Catalog, stats: &Statistics) -> Result<(u64, u64)> {
        let mut next_sequence = 1;
        let mut last_timestamp = 0;
        if !path.exists() {
            return Ok((next_sequence, last_timestamp));
        }

        let mut reader = wal::Reader::open(path)?;
        let mut records = 0u64;
        let mut cells = 0usize;
        while let Some(record) = reader.read_record()? {
            let edit = WalEdit::decode(&record)?;
            if let WalEdit::Mutation {
                sequence,
                cells: batch,
                ..
            } = &edit
            {
                next_sequence = next_sequence.max(sequence + batch.len() as u64);
                last_timestamp = batch
                    .iter()
                    .map(Cell::timestamp)
                    .fold(last_timestamp, u64::max);
            }
            cells += catalog.apply(&edit);
            records += 1;
        }

        let file_len = fs::metadata(path)?.len();
        if reader.valid_len() < file_len {
            warn!(
                valid_len = reader.valid_len(),
                file_len,
                "Dropping torn WAL tail"
            );
            OpenOptions::new()
                .write(true)
                .open(path)?
                .set_len(reader.valid_len())?;
        }

        stats.record_replayed(records);
        info!(records, cells, "Replayed WAL");
        Ok((next_sequence, last_timestamp))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Status::connection_closed());
        }
        Ok(())
    }

    /// Log a schema edit, apply it and refresh the catalog snapshot
    ///
    /// Once logged the edit is committed. The snapshot only shortens
    /// recovery, so failing to write it is logged and not returned.
    fn commit_schema(&self, writer: &mut WriteState, catalog: &mut Catalog, edit: WalEdit) -> Result<()> {
        writer.log(&edit, self.options.sync, &self.statistics)?;
        catalog.apply(&edit);
        self.statistics.set_memstore_bytes(catalog.memstore_bytes());
        if let Err(e) = catalog.save(&self.root.join(CATALOG_FILE)) {
            warn!(root = %self.root.display(), error = %e, "Failed to save catalog snapshot");
        }
        Ok(())
    }

    // ----- schema -----

    pub fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.check_open()?;
        descriptor.validate()?;

        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();
        if catalog.get(descriptor.name()).is_some() {
            return Err(Status::table_exists(descriptor.name()));
        }

        self.commit_schema(&mut writer, &mut catalog, WalEdit::CreateTable(descriptor.clone()))?;
        self.statistics.record_table_created();
        info!(
            table = %descriptor.name(),
            families = ?descriptor.family_names(),
            "Created table"
        );
        Ok(())
    }

    pub fn delete_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();
        if catalog.require(name)?.enabled {
            return Err(Status::table_not_disabled(name));
        }

        self.commit_schema(&mut writer, &mut catalog, WalEdit::DeleteTable(name.clone()))?;
        self.statistics.record_table_deleted();
        info!(table = %name, "Deleted table");
        Ok(())
    }

    pub fn set_enabled(&self, name: &TableName, enabled: bool) -> Result<()> {
        self.check_open()?;
        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();
        match (catalog.require(name)?.enabled, enabled) {
            (false, false) => return Err(Status::table_not_enabled(name)),
            (true, true) => return Err(Status::table_not_disabled(name)),
            _ => {}
        }

        self.commit_schema(&mut writer, &mut catalog, WalEdit::SetEnabled {
            table: name.clone(),
            enabled,
        })?;
        info!(table = %name, enabled, "Changed table state");
        Ok(())
    }

    /// Drop every cell of a disabled table and enable it again
    pub fn truncate_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();
        if catalog.require(name)?.enabled {
            return Err(Status::table_not_disabled(name));
        }

        self.commit_schema(&mut writer, &mut catalog, WalEdit::Truncate(name.clone()))?;
        self.commit_schema(&mut writer, &mut catalog, WalEdit::SetEnabled {
            table: name.clone(),
            enabled: true,
        })?;
        info!(table = %name, "Truncated table");
        Ok(())
    }

    pub fn add_family(&self, name: &TableName, family: ColumnFamilyDescriptor) -> Result<()> {
        self.check_open()?;
        family.validate()?;
        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();

        let mut descriptor = catalog.require(name)?.descriptor.clone();
        if descriptor.has_family(family.name().as_bytes()) {
            return Err(Status::invalid_argument(format!(
                "Family {} already exists in {name}",
                family.name()
            )));
        }
        debug!(table = %name, family = family.name(), "Adding column family");
        descriptor.add_family(family);

        self.commit_schema(&mut writer, &mut catalog, WalEdit::ModifyTable(descriptor))
    }

    pub fn delete_family(&self, name: &TableName, family: &str) -> Result<()> {
        self.check_open()?;
        let mut writer = self.writer.write();
        let mut catalog = self.catalog.write();

        let mut descriptor = catalog.require(name)?.descriptor.clone();
        if descriptor.remove_family(family).is_none() {
            return Err(Status::no_such_column_family(format!("{family} in {name}")));
        }
        if descriptor.family_count() == 0 {
            return Err(Status::invalid_argument(format!(
                "Cannot delete the last column family of {name}"
            )));
        }
        debug!(table = %name, family, "Deleting column family");

        self.commit_schema(&mut writer, &mut catalog, WalEdit::ModifyTable(descriptor))
    }

    pub fn table_names(&self) -> Result<Vec<TableName>> {
        self.check_open()?;
        Ok(self.catalog.read().names())
    }

    pub fn table_exists(&self, name: &TableName) -> Result<bool> {
        self.check_open()?;
        Ok(self.catalog.read().get(name).is_some())
    }

    pub fn descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        self.check_open()?;
        Ok(self.catalog.read().require(name)?.descriptor.clone())
    }

    pub fn is_enabled(&self, name: &TableName) -> Result<bool> {
        self.check_open()?;
        Ok(self.catalog.read().require(name)?.enabled)
    }

    // ----- data -----

    /// Apply a batch of row mutations atomically
    ///
    /// The whole batch is validated before anything is logged. Deletes of
    /// the latest version are resolved against the current row contents;
    /// the log records the concrete markers.
    pub fn mutate(&self, name: &TableName, mutations: &[RowMutation]) -> Result<()> {
        self.check_open()?;
        let mut writer = self.writer.write();
        let catalog = self.catalog.read();
        let table = catalog.require_enabled(name)?;
        let descriptor = &table.descriptor;

        for mutation in mutations {
            if mutation.row.is_empty() {
                return Err(Status::invalid_argument("Row key must not be empty"));
            }
            if mutation.is_empty() {
                return Err(Status::invalid_argument(format!(
                    "Put for row {} has no cells",
                    crate::util::Printable(&mutation.row)
                )));
            }
            if let Some(family) = mutation
                .families()
                .into_iter()
                .find(|f| !descriptor.has_family(f))
            {
                return Err(Status::no_such_column_family(format!(
                    "{} in {name}",
                    crate::util::Printable(family)
                )));
            }
        }

        let batch_ts = writer.next_timestamp();
        let now = now_ms();
        let mut cells = Vec::new();
        for mutation in mutations {
            self.resolve(&table.memstore, descriptor, mutation, batch_ts, now, &mut cells)?;
        }
        if cells.is_empty() {
            debug!(table = %name, "Batch resolved to no cells");
            return Ok(());
        }

        let sequence = writer.next_sequence;
        writer.next_sequence += cells.len() as u64;
        let edit = WalEdit::Mutation {
            table: name.clone(),
            sequence,
            cells: cells.clone(),
        };
        writer.log(&edit, self.options.sync, &self.statistics)?;

        let markers = cells.iter().filter(|c| c.is_delete()).count() as u64;
        let bytes = cells.iter().map(Cell::heap_size).sum::<usize>() as u64;
        for (i, cell) in cells.iter().enumerate() {
            table.memstore.add(sequence + i as u64, cell);
        }
        self.statistics
            .record_batch(cells.len() as u64 - markers, markers, bytes);
        self.statistics.set_memstore_bytes(catalog.memstore_bytes());
        Ok(())
    }

    /// Turn one row mutation into concrete cells
    ///
    /// A put cell carrying [`LATEST_TIMESTAMP`] is stamped with the batch
    /// timestamp, whether the caller left the timestamp out or passed
    /// `u64::MAX` explicitly.
    fn resolve(
        &self,
        memstore: &MemStore,
        descriptor: &TableDescriptor,
        mutation: &RowMutation,
        batch_ts: u64,
        now: u64,
        out: &mut Vec<Cell>,
    ) -> Result<()> {
        let row = &mutation.row;
        let stamp = |ts: u64| if ts == LATEST_TIMESTAMP { batch_ts } else { ts };
        let marker = |family: &Bytes, qualifier: Bytes, ts: u64, cell_type: CellType| {
            Cell::marker(row.clone(), family.clone(), qualifier, ts, cell_type)
        };

        match &mutation.kind {
            MutationKind::Put(cells) => {
                for cell in cells {
                    let ts = stamp(cell.timestamp());
                    out.push(cell.clone().with_timestamp(ts));
                }
            }
            MutationKind::Delete(targets) => {
                for target in targets {
                    match target {
                        DeleteTarget::Row => {
                            for cf in descriptor.families() {
                                let family = Bytes::copy_from_slice(cf.name().as_bytes());
                                out.push(marker(&family, Bytes::new(), batch_ts, CellType::DeleteFamily)?);
                            }
                        }
                        DeleteTarget::Family(family) => {
                            out.push(marker(family, Bytes::new(), batch_ts, CellType::DeleteFamily)?);
                        }
                        DeleteTarget::Column { family, qualifier } => {
                            out.push(marker(family, qualifier.clone(), batch_ts, CellType::DeleteColumn)?);
                        }
                        DeleteTarget::Version {
                            family,
                            qualifier,
                            timestamp,
                        } => {
                            out.push(marker(family, qualifier.clone(), *timestamp, CellType::Delete)?);
                        }
                        DeleteTarget::LatestVersion { family, qualifier } => {
                            let mut spec = ReadSpec::default();
                            spec.columns.add_column(family.clone(), qualifier.clone());
                            let stored = memstore.row(row)?;
                            match visible_cells(&stored, descriptor, &spec, now).first() {
                                Some(latest) => out.push(marker(
                                    family,
                                    qualifier.clone(),
                                    latest.timestamp(),
                                    CellType::Delete,
                                )?),
                                None => debug!(
                                    row = %crate::util::Printable(row),
                                    "No version to delete"
                                ),
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Visible cells of one row; empty if the row does not exist
    pub fn get_row(&self, name: &TableName, row: &[u8], spec: &ReadSpec) -> Result<Vec<Cell>> {
        self.check_open()?;
        let _writer = self.writer.read();
        let catalog = self.catalog.read();
        let table = catalog.require_enabled(name)?;
        self.check_families(&table.descriptor, spec)?;

        let stored = table.memstore.row(row)?;
        let cells = visible_cells(&stored, &table.descriptor, spec, now_ms());
        self.statistics.record_get(cells.len() as u64);
        Ok(cells)
    }

    /// Up to `limit` non-empty rows in `[start, stop)`
    ///
    /// An empty `stop` means no upper bound.
    pub fn scan_rows(
        &self,
        name: &TableName,
        start: &[u8],
        stop: &[u8],
        limit: usize,
        spec: &ReadSpec,
    ) -> Result<Vec<ScannedRow>> {
        self.check_open()?;
        let _writer = self.writer.read();
        let catalog = self.catalog.read();
        let table = catalog.require_enabled(name)?;
        self.check_families(&table.descriptor, spec)?;

        let now = now_ms();
        let mut rows = Vec::new();
        let mut cell_count = 0;
        for entry in table.memstore.rows_from(start) {
            if rows.len() >= limit {
                break;
            }
            let (row, stored) = entry?;
            if !stop.is_empty() && row.as_ref() >= stop {
                break;
            }
            let cells = visible_cells(&stored, &table.descriptor, spec, now);
            if !cells.is_empty() {
                cell_count += cells.len();
                rows.push((row, cells));
            }
        }

        self.statistics
            .record_scan_batch(rows.len() as u64, cell_count as u64);
        Ok(rows)
    }

    fn check_families(&self, descriptor: &TableDescriptor, spec: &ReadSpec) -> Result<()> {
        match spec.columns.families().find(|f| !descriptor.has_family(f)) {
            Some(family) => Err(Status::no_such_column_family(format!(
                "{} in {}",
                crate::util::Printable(family),
                descriptor.name()
            ))),
            None => Ok(()),
        }
    }

    // ----- maintenance -----

    /// Rewrite the WAL with only the entries retention keeps
    ///
    /// The new log starts with the schema of every table, so it stands on
    /// its own even without the catalog snapshot.
    pub fn compact(&self) -> Result<()> {
        self.check_open()?;
        self.compact_locked(&mut self.writer.write())
    }

    fn compact_locked(&self, writer: &mut WriteState) -> Result<()> {
        let catalog = self.catalog.read();
        let now = now_ms();
        let before = writer.wal.offset();

        let tmp_path = self.root.join(format!("{WAL_FILE}.tmp"));
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }
        let mut next = wal::Writer::open(&tmp_path)?;
        let mut kept = 0usize;

        for table in catalog.tables() {
            let name = table.descriptor.name().clone();
            next.add_record(&WalEdit::CreateTable(table.descriptor.clone()).encode()?)?;
            if !table.enabled {
                next.add_record(
                    &WalEdit::SetEnabled {
                        table: name.clone(),
                        enabled: false,
                    }
                    .encode()?,
                )?;
            }

            let mut retained: Vec<StoredCell> = Vec::new();
            for entry in table.memstore.rows_from(b"") {
                let (_, stored) = entry?;
                retained.extend(retained_entries(&stored, &table.descriptor, now));
            }
            // New sequences must keep the write order of equal timestamps
            retained.sort_by_key(|e| e.sequence);

            // The memstore keeps the same survivors, under the sequences the
            // new log assigns them
            let before_cells = table.memstore.len();
            table.memstore.clear();
            let mut sequence = writer.next_sequence;
            for chunk in retained.chunks(COMPACTION_CHUNK) {
                let cells: Vec<Cell> = chunk.iter().map(|e| e.cell.clone()).collect();
                for (i, cell) in cells.iter().enumerate() {
                    table.memstore.add(sequence + i as u64, cell);
                }
                next.add_record(
                    &WalEdit::Mutation {
                        table: name.clone(),
                        sequence,
                        cells,
                    }
                    .encode()?,
                )?;
                sequence += chunk.len() as u64;
            }
            writer.next_sequence = sequence;
            kept += retained.len();
            debug!(
                table = %name,
                before = before_cells,
                after = retained.len(),
                "Compacted memstore"
            );
        }

        next.sync()?;
        drop(next);
        fs::rename(&tmp_path, self.root.join(WAL_FILE))?;
        catalog.save(&self.root.join(CATALOG_FILE))?;
        writer.wal = wal::Writer::open(self.root.join(WAL_FILE))?;

        self.statistics.set_memstore_bytes(catalog.memstore_bytes());
        self.statistics.record_wal_compaction();
        info!(
            before_bytes = before,
            after_bytes = writer.wal.offset(),
            cells = kept,
            "Compacted WAL"
        );
        Ok(())
    }

    /// Sync the log, compact it if it outgrew the threshold and release the
    /// directory. Calling it again is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let result = {
            let mut writer = self.writer.write();
            let synced = writer.wal.sync();
            match synced {
                Ok(()) if writer.wal.offset() > self.options.wal_compact_bytes => {
                    self.compact_locked(&mut writer)
                }
                other => other,
            }
        };

        self.lock.lock().take();
        info!(root = %self.root.display(), "Closed store");
        result
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(root = %self.root.display(), error = %e, "Failed to close store cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Code;

    fn table() -> TableName {
        TableName::value_of("t_phone_info").unwrap()
    }

    fn descriptor() -> TableDescriptor {
        let mut cf = ColumnFamilyDescriptor::new("info");
        cf.set_versions(0, 3).unwrap();
        let mut desc = TableDescriptor::new(table());
        desc.add_family(cf);
        desc
    }

    fn put(row: &str, qualifier: &str, ts: u64, value: &str) -> RowMutation {
        RowMutation {
            row: Bytes::copy_from_slice(row.as_bytes()),
            kind: MutationKind::Put(vec![Cell::put(
                Bytes::copy_from_slice(row.as_bytes()),
                Bytes::from_static(b"info"),
                Bytes::copy_from_slice(qualifier.as_bytes()),
                ts,
                Bytes::copy_from_slice(value.as_bytes()),
            )]),
        }
    }

    fn delete(row: &str, target: DeleteTarget) -> RowMutation {
        RowMutation {
            row: Bytes::copy_from_slice(row.as_bytes()),
            kind: MutationKind::Delete(vec![target]),
        }
    }

    fn values(cells: &[Cell]) -> Vec<&[u8]> {
        cells.iter().map(|c| c.value().as_ref()).collect()
    }

    fn open(dir: &Path) -> Store {
        Store::open(dir, StoreOptions::default()).unwrap()
    }

    #[test]
    fn test_put_get_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();

        store.mutate(&table(), &[put("r1", "name", 10, "a")]).unwrap();
        store.mutate(&table(), &[put("r1", "name", 20, "b")]).unwrap();

        let latest = store.get_row(&table(), b"r1", &ReadSpec::default()).unwrap();
        assert_eq!(values(&latest), vec![b"b".as_ref()]);

        let spec = ReadSpec {
            max_versions: 5,
            ..ReadSpec::default()
        };
        let all = store.get_row(&table(), b"r1", &spec).unwrap();
        assert_eq!(values(&all), vec![b"b".as_ref(), b"a".as_ref()]);
    }

    #[test]
    fn test_assigned_timestamps_increase() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();

        for v in ["1", "2", "3"] {
            store
                .mutate(&table(), &[put("r", "q", LATEST_TIMESTAMP, v)])
                .unwrap();
        }
        let spec = ReadSpec {
            max_versions: 3,
            ..ReadSpec::default()
        };
        let cells = store.get_row(&table(), b"r", &spec).unwrap();
        assert_eq!(values(&cells), vec![b"3".as_ref(), b"2".as_ref(), b"1".as_ref()]);
        assert!(cells[0].timestamp() > cells[1].timestamp());
        assert!(cells[1].timestamp() > cells[2].timestamp());
    }

    #[test]
    fn test_delete_latest_reveals_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();
        store
            .mutate(&table(), &[put("r", "q", 1, "old"), put("r", "q", 2, "new")])
            .unwrap();

        store
            .mutate(&table(), &[delete("r", DeleteTarget::LatestVersion {
                family: Bytes::from_static(b"info"),
                qualifier: Bytes::from_static(b"q"),
            })])
            .unwrap();

        let cells = store.get_row(&table(), b"r", &ReadSpec::default()).unwrap();
        assert_eq!(values(&cells), vec![b"old".as_ref()]);
    }

    #[test]
    fn test_row_delete_and_scan_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();
        for row in ["a", "b", "c", "d"] {
            store.mutate(&table(), &[put(row, "q", 1, row)]).unwrap();
        }
        store.mutate(&table(), &[delete("b", DeleteTarget::Row)]).unwrap();

        let rows = store
            .scan_rows(&table(), b"a", b"d", 10, &ReadSpec::default())
            .unwrap();
        let keys: Vec<&[u8]> = rows.iter().map(|(r, _)| r.as_ref()).collect();
        assert_eq!(keys, vec![b"a".as_ref(), b"c".as_ref()]);

        let limited = store
            .scan_rows(&table(), b"", b"", 1, &ReadSpec::default())
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_batch_is_validated_before_apply() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();

        let mut bad = put("r2", "q", 1, "x");
        if let MutationKind::Put(cells) = &mut bad.kind {
            cells[0] = Cell::put(
                Bytes::from_static(b"r2"),
                Bytes::from_static(b"nope"),
                Bytes::from_static(b"q"),
                1,
                Bytes::from_static(b"x"),
            );
        }
        let err = store
            .mutate(&table(), &[put("r1", "q", 1, "ok"), bad])
            .unwrap_err();
        assert_eq!(err.code(), Code::NoSuchColumnFamily);
        assert!(store
            .get_row(&table(), b"r1", &ReadSpec::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_table_state_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();

        assert_eq!(store.create_table(&descriptor()).unwrap_err().code(), Code::TableExists);
        assert_eq!(store.delete_table(&table()).unwrap_err().code(), Code::TableNotDisabled);

        store.set_enabled(&table(), false).unwrap();
        assert_eq!(
            store.set_enabled(&table(), false).unwrap_err().code(),
            Code::TableNotEnabled
        );
        assert_eq!(
            store
                .get_row(&table(), b"r", &ReadSpec::default())
                .unwrap_err()
                .code(),
            Code::TableNotEnabled
        );

        store.delete_table(&table()).unwrap();
        assert!(!store.table_exists(&table()).unwrap());
        assert_eq!(store.is_enabled(&table()).unwrap_err().code(), Code::TableNotFound);
    }

    #[test]
    fn test_truncate_and_family_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();
        store.mutate(&table(), &[put("r", "q", 1, "v")]).unwrap();

        store.set_enabled(&table(), false).unwrap();
        store.truncate_table(&table()).unwrap();
        assert!(store.is_enabled(&table()).unwrap());
        assert!(store
            .get_row(&table(), b"r", &ReadSpec::default())
            .unwrap()
            .is_empty());

        store
            .add_family(&table(), ColumnFamilyDescriptor::new("extra"))
            .unwrap();
        assert_eq!(
            store
                .add_family(&table(), ColumnFamilyDescriptor::new("extra"))
                .unwrap_err()
                .code(),
            Code::InvalidArgument
        );
        store.delete_family(&table(), "extra").unwrap();
        assert_eq!(
            store.delete_family(&table(), "info").unwrap_err().code(),
            Code::InvalidArgument
        );
        assert_eq!(
            store.delete_family(&table(), "extra").unwrap_err().code(),
            Code::NoSuchColumnFamily
        );
    }

    #[test]
    fn test_reopen_replays_wal() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path());
            store.create_table(&descriptor()).unwrap();
            store.mutate(&table(), &[put("r", "q", 5, "v5")]).unwrap();
            store.mutate(&table(), &[put("r", "q", 6, "v6")]).unwrap();
            store.close().unwrap();
        }

        let store = open(dir.path());
        let cells = store.get_row(&table(), b"r", &ReadSpec::default()).unwrap();
        assert_eq!(values(&cells), vec![b"v6".as_ref()]);
        assert_eq!(store.statistics().snapshot().wal_records_replayed, 3);
    }

    #[test]
    fn test_compaction_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open(dir.path());
            store.create_table(&descriptor()).unwrap();
            for ts in 1..=5 {
                store
                    .mutate(&table(), &[put("r", "q", ts, &format!("v{ts}"))])
                    .unwrap();
            }
            store
                .mutate(&table(), &[delete("gone", DeleteTarget::Row)])
                .unwrap();
            store.compact().unwrap();
        }

        let store = open(dir.path());
        let spec = ReadSpec {
            max_versions: 10,
            ..ReadSpec::default()
        };
        let cells = store.get_row(&table(), b"r", &spec).unwrap();
        assert_eq!(values(&cells), vec![b"v5".as_ref(), b"v4".as_ref(), b"v3".as_ref()]);
    }

    #[test]
    fn test_compaction_renumbers_in_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let mut cf = ColumnFamilyDescriptor::new("info");
        cf.set_keep_deleted_cells(true);
        let mut desc = TableDescriptor::new(table());
        desc.add_family(cf);
        store.create_table(&desc).unwrap();

        store.mutate(&table(), &[put("r", "q", 10, "first")]).unwrap();
        store.mutate(&table(), &[put("r", "q", 10, "second")]).unwrap();
        store.compact().unwrap();

        let cells = store.get_row(&table(), b"r", &ReadSpec::default()).unwrap();
        assert_eq!(values(&cells), vec![b"second".as_ref()]);
    }

    #[test]
    fn test_catalog_snapshot_failure_keeps_commit() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("catalog.json.tmp");
        {
            let store = open(dir.path());
            fs::create_dir(&blocker).unwrap();
            store.create_table(&descriptor()).unwrap();
            assert!(store.table_exists(&table()).unwrap());
            store.close().unwrap();
        }
        fs::remove_dir(&blocker).unwrap();

        let store = open(dir.path());
        assert!(store.table_exists(&table()).unwrap());
    }

    #[test]
    fn test_memstore_bytes_gauge() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();
        assert_eq!(store.statistics().snapshot().memstore_bytes, 0);

        store.mutate(&table(), &[put("r", "q", 1, "v")]).unwrap();
        assert!(store.statistics().snapshot().memstore_bytes > 0);

        store.set_enabled(&table(), false).unwrap();
        store.truncate_table(&table()).unwrap();
        assert_eq!(store.statistics().snapshot().memstore_bytes, 0);
    }

    #[test]
    fn test_stale_lock_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOCK_FILE), b"").unwrap();
        let store = open(dir.path());
        store.create_table(&descriptor()).unwrap();
    }

    #[test]
    fn test_second_open_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let err = Store::open(dir.path(), StoreOptions::default()).err().unwrap();
        assert_eq!(err.code(), Code::Busy);

        store.close().unwrap();
        store.close().unwrap();
        assert_eq!(store.table_names().unwrap_err().code(), Code::ConnectionClosed);
        let _again = open(dir.path());
    }
}
