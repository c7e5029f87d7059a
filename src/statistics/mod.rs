use std::sync::atomic::{AtomicU64, Ordering};

/// Store-wide operation counters
///
/// Lock-free; every counter is a relaxed atomic.
#[derive(Debug, Default)]
pub struct Statistics {
    // Mutations
    pub num_batches: AtomicU64,
    pub num_cells_written: AtomicU64,
    pub num_delete_markers: AtomicU64,
    pub bytes_written: AtomicU64,

    // Reads
    pub num_gets: AtomicU64,
    pub num_scan_batches: AtomicU64,
    pub num_rows_read: AtomicU64,
    pub num_cells_read: AtomicU64,

    // WAL
    pub wal_writes: AtomicU64,
    pub wal_bytes_written: AtomicU64,
    pub wal_syncs: AtomicU64,
    pub wal_compactions: AtomicU64,
    pub wal_records_replayed: AtomicU64,

    // Schema
    pub num_tables_created: AtomicU64,
    pub num_tables_deleted: AtomicU64,

    /// Gauge: approximate bytes held by all memstores
    pub memstore_bytes: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    #[inline]
    pub fn record_batch(&self, cells: u64, markers: u64, bytes: u64) {
        self.num_batches.fetch_add(1, Ordering::Relaxed);
        self.num_cells_written.fetch_add(cells, Ordering::Relaxed);
        self.num_delete_markers.fetch_add(markers, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_get(&self, cells: u64) {
        self.num_gets.fetch_add(1, Ordering::Relaxed);
        self.num_cells_read.fetch_add(cells, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_scan_batch(&self, rows: u64, cells: u64) {
        self.num_scan_batches.fetch_add(1, Ordering::Relaxed);
        self.num_rows_read.fetch_add(rows, Ordering::Relaxed);
        self.num_cells_read.fetch_add(cells, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_wal_write(&self, bytes: u64) {
        self.wal_writes.fetch_add(1, Ordering::Relaxed);
        self.wal_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_wal_sync(&self) {
        self.wal_syncs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_wal_compaction(&self) {
        self.wal_compactions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_replayed(&self, records: u64) {
        self.wal_records_replayed
            .fetch_add(records, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_created(&self) {
        self.num_tables_created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_deleted(&self) {
        self.num_tables_deleted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn set_memstore_bytes(&self, bytes: u64) {
        self.memstore_bytes.store(bytes, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatisticsSnapshot {
            num_batches: load(&self.num_batches),
            num_cells_written: load(&self.num_cells_written),
            num_delete_markers: load(&self.num_delete_markers),
            bytes_written: load(&self.bytes_written),
            num_gets: load(&self.num_gets),
            num_scan_batches: load(&self.num_scan_batches),
            num_rows_read: load(&self.num_rows_read),
            num_cells_read: load(&self.num_cells_read),
            wal_writes: load(&self.wal_writes),
            wal_bytes_written: load(&self.wal_bytes_written),
            wal_syncs: load(&self.wal_syncs),
            wal_compactions: load(&self.wal_compactions),
            wal_records_replayed: load(&self.wal_records_replayed),
            num_tables_created: load(&self.num_tables_created),
            num_tables_deleted: load(&self.num_tables_deleted),
            memstore_bytes: load(&self.memstore_bytes),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub num_batches: u64,
    pub num_cells_written: u64,
    pub num_delete_markers: u64,
    pub bytes_written: u64,
    pub num_gets: u64,
    pub num_scan_batches: u64,
    pub num_rows_read: u64,
    pub num_cells_read: u64,
    pub wal_writes: u64,
    pub wal_bytes_written: u64,
    pub wal_syncs: u64,
    pub wal_compactions: u64,
    pub wal_records_replayed: u64,
    pub num_tables_created: u64,
    pub num_tables_deleted: u64,
    pub memstore_bytes: u64,
}
