//! Table schema types
//!
//! A table is described by its name and the set of column families it
//! declares. Families are the unit of version retention: every cell written
//! to a family obeys that family's `min_versions`/`max_versions`/TTL.
//!
//! ```text
//! TableDescriptor("t_phone_info")
//!  ├─→ ColumnFamilyDescriptor("base_info")   versions 0..=1
//!  └─→ ColumnFamilyDescriptor("extra_info")  versions 1..=3
//! ```

pub mod column_family_descriptor;
pub mod table_descriptor;
pub mod table_name;

pub use column_family_descriptor::ColumnFamilyDescriptor;
pub use table_descriptor::TableDescriptor;
pub use table_name::{DEFAULT_NAMESPACE, TableName};
