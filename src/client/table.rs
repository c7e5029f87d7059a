use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    client::{Delete, Get, Put, RowResult, RowScanner, Scan},
    schema::{TableDescriptor, TableName},
    store::{ReadSpec, RowMutation, Store},
    util::{Result, Status},
};

/// Data operations on one table
pub struct Table {
    name: TableName,
    store: Arc<Store>,
    scanner_caching: usize,
    closed: AtomicBool,
}

impl Table {
    pub(crate) fn new(name: TableName, store: Arc<Store>, scanner_caching: usize) -> Self {
        Table {
            name,
            store,
            scanner_caching,
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn descriptor(&self) -> Result<TableDescriptor> {
        self.check_open()?;
        self.store.descriptor(&self.name)
    }

    pub fn put(&self, put: Put) -> Result<()> {
        self.put_batch(vec![put])
    }

    /// Write every put or none of them
    pub fn put_batch(&self, puts: Vec<Put>) -> Result<()> {
        self.check_open()?;
        let mutations: Vec<RowMutation> = puts.into_iter().map(Put::into_mutation).collect();
        self.store.mutate(&self.name, &mutations)
    }

    /// Cells of one row; a missing row gives an empty result
    pub fn get(&self, get: &Get) -> Result<RowResult> {
        self.check_open()?;
        check_versions(get.spec())?;
        let cells = self.store.get_row(&self.name, get.row(), get.spec())?;
        Ok(RowResult::new(get.row().clone(), cells))
    }

    pub fn exists(&self, get: &Get) -> Result<bool> {
        Ok(!self.get(get)?.is_empty())
    }

    pub fn scanner(&self, scan: &Scan) -> Result<RowScanner> {
        self.check_open()?;
        check_versions(scan.spec())?;
        // Surface a missing or disabled table here rather than on first next()
        self.store.descriptor(&self.name)?;
        if !self.store.is_enabled(&self.name)? {
            return Err(Status::table_not_enabled(&self.name));
        }

        Ok(RowScanner::new(
            self.store.clone(),
            self.name.clone(),
            scan.spec().clone(),
            scan.start_row().clone(),
            scan.stop_row().clone(),
            scan.caching().unwrap_or(self.scanner_caching),
            scan.limit(),
        ))
    }

    pub fn delete(&self, delete: Delete) -> Result<()> {
        self.delete_batch(vec![delete])
    }

    pub fn delete_batch(&self, deletes: Vec<Delete>) -> Result<()> {
        self.check_open()?;
        let mutations: Vec<RowMutation> = deletes.into_iter().map(Delete::into_mutation).collect();
        self.store.mutate(&self.name, &mutations)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Status::connection_closed());
        }
        Ok(())
    }
}

fn check_versions(spec: &ReadSpec) -> Result<()> {
    if spec.max_versions == 0 {
        return Err(Status::invalid_argument("Versions to read must be at least 1"));
    }
    Ok(())
}
