use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Schema of one column family
///
/// Families are declared up front; every cell belongs to exactly one. The
/// retention settings decide how many versions of a column a read may see
/// and which versions survive compaction.
///
/// # Example
///
/// ```
/// use cellstore::ColumnFamilyDescriptor;
///
/// let mut extra = ColumnFamilyDescriptor::new("extra_info");
/// extra.set_versions(1, 3).unwrap();
/// assert_eq!(extra.max_versions(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    name: String,

    /// Versions kept by compaction even when they are past the TTL
    /// Default: 0
    #[serde(default)]
    min_versions: u32,

    /// Versions visible to reads and kept by compaction
    /// Default: 1
    #[serde(default = "default_max_versions")]
    max_versions: u32,

    /// Seconds a version stays visible (None = forever)
    #[serde(default)]
    time_to_live: Option<u64>,

    /// Keep delete markers and masked puts through compaction
    #[serde(default)]
    keep_deleted_cells: bool,
}

pub const DEFAULT_MAX_VERSIONS: u32 = 1;

fn default_max_versions() -> u32 {
    DEFAULT_MAX_VERSIONS
}

impl ColumnFamilyDescriptor {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ColumnFamilyDescriptor {
            name: name.into(),
            min_versions: 0,
            max_versions: DEFAULT_MAX_VERSIONS,
            time_to_live: None,
            keep_deleted_cells: false,
        }
    }

    /// Set retained-version bounds
    pub fn set_versions(&mut self, min_versions: u32, max_versions: u32) -> Result<&mut Self> {
        if max_versions == 0 {
            return Err(Status::invalid_argument("max_versions must be at least 1"));
        }
        if min_versions > max_versions {
            return Err(Status::invalid_argument(format!(
                "min_versions ({min_versions}) exceeds max_versions ({max_versions})"
            )));
        }
        self.min_versions = min_versions;
        self.max_versions = max_versions;
        Ok(self)
    }

    pub fn set_time_to_live(&mut self, seconds: u64) -> &mut Self {
        self.time_to_live = Some(seconds);
        self
    }

    pub fn set_keep_deleted_cells(&mut self, keep: bool) -> &mut Self {
        self.keep_deleted_cells = keep;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_versions(&self) -> u32 {
        self.min_versions
    }

    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    pub fn time_to_live(&self) -> Option<u64> {
        self.time_to_live
    }

    pub fn keep_deleted_cells(&self) -> bool {
        self.keep_deleted_cells
    }

    /// Oldest timestamp (ms) still visible at `now_ms`, if a TTL is set
    pub(crate) fn ttl_cutoff(&self, now_ms: u64) -> Option<u64> {
        self.time_to_live
            .map(|ttl| now_ms.saturating_sub(ttl.saturating_mul(1000)))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Status::invalid_argument("Column family name is empty"));
        }
        if self
            .name
            .chars()
            .any(|c| c == ':' || c.is_control() || c.is_whitespace())
        {
            return Err(Status::invalid_argument(format!(
                "Illegal column family name: {:?}",
                self.name
            )));
        }
        if self.max_versions == 0 || self.min_versions > self.max_versions {
            return Err(Status::invalid_argument(format!(
                "Bad version bounds on family {}",
                self.name
            )));
        }
        Ok(())
    }
}
