use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    schema::{ColumnFamilyDescriptor, TableDescriptor, TableName},
    store::Store,
    util::{Result, Status},
};

/// Schema operations
///
/// `delete_table` and `truncate_table` require the table to be disabled
/// first, so the usual teardown is:
///
/// ```no_run
/// # fn teardown(admin: &cellstore::Admin, name: &cellstore::TableName) -> cellstore::Result<()> {
/// if admin.table_exists(name)? {
///     if admin.is_table_enabled(name)? {
///         admin.disable_table(name)?;
///     }
///     admin.delete_table(name)?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Admin {
    store: Arc<Store>,
    closed: AtomicBool,
}

impl Admin {
    pub(crate) fn new(store: Arc<Store>) -> Self {
        Admin {
            store,
            closed: AtomicBool::new(false),
        }
    }

    pub fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        self.check_open()?;
        self.store.create_table(descriptor)
    }

    pub fn table_exists(&self, name: &TableName) -> Result<bool> {
        self.check_open()?;
        self.store.table_exists(name)
    }

    /// Every table, sorted by name
    pub fn list_table_names(&self) -> Result<Vec<TableName>> {
        self.check_open()?;
        self.store.table_names()
    }

    pub fn get_descriptor(&self, name: &TableName) -> Result<TableDescriptor> {
        self.check_open()?;
        self.store.descriptor(name)
    }

    pub fn disable_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        self.store.set_enabled(name, false)
    }

    pub fn enable_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        self.store.set_enabled(name, true)
    }

    pub fn is_table_enabled(&self, name: &TableName) -> Result<bool> {
        self.check_open()?;
        self.store.is_enabled(name)
    }

    pub fn is_table_disabled(&self, name: &TableName) -> Result<bool> {
        Ok(!self.is_table_enabled(name)?)
    }

    pub fn delete_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        self.store.delete_table(name)
    }

    pub fn truncate_table(&self, name: &TableName) -> Result<()> {
        self.check_open()?;
        self.store.truncate_table(name)
    }

    pub fn add_column_family(&self, name: &TableName, family: ColumnFamilyDescriptor) -> Result<()> {
        self.check_open()?;
        self.store.add_family(name, family)
    }

    pub fn delete_column_family(&self, name: &TableName, family: &str) -> Result<()> {
        self.check_open()?;
        self.store.delete_family(name, family)
    }

    /// Rewrite the write-ahead log now instead of waiting for close
    pub fn compact(&self) -> Result<()> {
        self.check_open()?;
        self.store.compact()
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
