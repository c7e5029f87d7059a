use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    client::{Admin, Table},
    config::{Configuration, Coordinator, StoreOptions, keys},
    schema::TableName,
    statistics::Statistics,
    store::Store,
    util::{Result, Status},
};

pub struct ConnectionFactory;

impl ConnectionFactory {
    /// Open the store named by `cellstore.rootdir`
    ///
    /// The quorum is validated and kept for reporting; the store itself is
    /// embedded, so nothing is dialed.
    pub fn create_connection(conf: &Configuration) -> Result<Connection> {
        let quorum = conf.quorum()?;
        if quorum.is_empty() {
            return Err(Status::invalid_argument("Empty coordinator quorum"));
        }
        let root = conf.require(keys::ROOT_DIR)?;
        let options = StoreOptions::from_configuration(conf)?;

        let store = Store::open(root, options)?;
        info!(
            root,
            quorum = %quorum.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            "Connected"
        );

        Ok(Connection {
            store: Arc::new(store),
            quorum,
        })
    }
}

/// An open store plus the settings it was opened with
///
/// Closing (or dropping) the connection closes the store: handles obtained
/// from it fail with `ConnectionClosed` afterwards.
pub struct Connection {
    store: Arc<Store>,
    quorum: Vec<Coordinator>,
}

impl Connection {
    pub fn admin(&self) -> Result<Admin> {
        self.check_open()?;
        Ok(Admin::new(self.store.clone()))
    }

    /// Handle for one table; the table is looked up when an operation runs
    pub fn table(&self, name: TableName) -> Result<Table> {
        self.check_open()?;
        Ok(Table::new(
            name,
            self.store.clone(),
            self.store.options().scanner_caching,
        ))
    }

    pub fn quorum(&self) -> &[Coordinator] {
        &self.quorum
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        self.store.statistics()
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_closed()
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Status::connection_closed());
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close connection");
        }
    }
}
