mod catalog;
pub mod mutation;
pub mod read;
#[allow(clippy::module_inception)]
mod store;

pub use mutation::{DeleteTarget, LATEST_TIMESTAMP, MutationKind, RowMutation};
pub use read::{ColumnFilter, ReadSpec, TimeRange};
pub use store::{ScannedRow, Store, now_ms};
