pub mod bytes;
pub mod status;

pub use self::bytes::{Printable, next_row_key, to_bytes};
pub use status::{Code, Result, Status};
