#[allow(clippy::module_inception)]
mod memstore;
mod row_iter;

pub use memstore::{MemStore, StoredCell};
pub use row_iter::RowIter;
