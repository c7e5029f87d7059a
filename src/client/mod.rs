//! Client-side handles over an embedded [`Store`](crate::store::Store)
//!
//! A [`Connection`] owns the store; [`Admin`] and [`Table`] are cheap
//! handles sharing it. Operations are described with the [`Put`], [`Get`],
//! [`Scan`] and [`Delete`] builders and results come back as [`RowResult`].

mod admin;
mod connection;
mod operations;
mod result;
mod scanner;
mod table;

pub use admin::Admin;
pub use connection::{Connection, ConnectionFactory};
pub use operations::{Delete, Get, Put, Scan};
pub use result::RowResult;
pub use scanner::RowScanner;
pub use table::Table;
