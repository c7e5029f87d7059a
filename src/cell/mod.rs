#[allow(clippy::module_inception)]
mod cell;
pub mod cell_key;

pub use cell::{Cell, CellType};
pub use cell_key::CellKey;
