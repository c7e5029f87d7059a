//! Column-family table store with an HBase-style client API
//!
//! ```no_run
//! use cellstore::{
//!     ColumnFamilyDescriptor, Configuration, ConnectionFactory, Get, Put, TableDescriptor,
//!     TableName, config::keys,
//! };
//!
//! # fn main() -> cellstore::Result<()> {
//! let mut conf = Configuration::create();
//! conf.set(keys::QUORUM, "localhost:2181")
//!     .set(keys::ROOT_DIR, "/tmp/cellstore");
//! let conn = ConnectionFactory::create_connection(&conf)?;
//!
//! let name = TableName::value_of("t_phone_info")?;
//! let mut desc = TableDescriptor::new(name.clone());
//! desc.add_family(ColumnFamilyDescriptor::new("base_info"));
//! conn.admin()?.create_table(&desc)?;
//!
//! let table = conn.table(name)?;
//! let mut put = Put::new("p001");
//! put.add_column("base_info", "brand", "Apple");
//! table.put(put)?;
//!
//! let row = table.get(&Get::new("p001"))?;
//! assert_eq!(row.value("base_info", "brand").unwrap().as_ref(), b"Apple");
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod client;
pub mod config;
pub mod memstore;
pub mod schema;
pub mod statistics;
pub mod store;
pub mod util;
pub mod wal;

pub use cell::{Cell, CellType};
pub use client::{
    Admin, Connection, ConnectionFactory, Delete, Get, Put, RowResult, RowScanner, Scan, Table,
};
pub use config::{Configuration, StoreOptions};
pub use schema::{ColumnFamilyDescriptor, TableDescriptor, TableName};
pub use statistics::Statistics;
pub use store::LATEST_TIMESTAMP;
pub use util::{Code, Result, Status};
