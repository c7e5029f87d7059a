//! Write-ahead log
//!
//! Every mutation batch and schema change is appended here before it becomes
//! visible. On open the store replays the log to rebuild its memstores.
pub mod edit;
pub mod log_format;
pub mod reader;
pub mod writer;

pub use edit::WalEdit;
pub use log_format::{BLOCK_SIZE, HEADER_SIZE, RecordType};
pub use reader::Reader;
pub use writer::Writer;
