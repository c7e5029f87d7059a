use bytes::Bytes;

use crate::cell::Cell;

/// Timestamp placeholder: the store assigns the batch timestamp
pub const LATEST_TIMESTAMP: u64 = u64::MAX;

/// What a row delete removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Every family of the row
    Row,
    /// Every column of one family
    Family(Bytes),
    /// Every version of one column
    Column { family: Bytes, qualifier: Bytes },
    /// The newest visible version of one column, resolved when applied
    LatestVersion { family: Bytes, qualifier: Bytes },
    /// One exact version of a column
    Version {
        family: Bytes,
        qualifier: Bytes,
        timestamp: u64,
    },
}

impl DeleteTarget {
    pub fn family(&self) -> Option<&Bytes> {
        match self {
            DeleteTarget::Row => None,
            DeleteTarget::Family(family)
            | DeleteTarget::Column { family, .. }
            | DeleteTarget::LatestVersion { family, .. }
            | DeleteTarget::Version { family, .. } => Some(family),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Cells to write; a timestamp of [`LATEST_TIMESTAMP`] is assigned on
    /// apply
    Put(Vec<Cell>),
    Delete(Vec<DeleteTarget>),
}

/// A set of changes to one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutation {
    pub row: Bytes,
    pub kind: MutationKind,
}

impl RowMutation {
    /// Families the mutation writes to; `None` for whole-row deletes
    pub(crate) fn families(&self) -> Vec<&Bytes> {
        match &self.kind {
            MutationKind::Put(cells) => cells.iter().map(Cell::family).collect(),
            MutationKind::Delete(targets) => targets.iter().filter_map(DeleteTarget::family).collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match &self.kind {
            MutationKind::Put(cells) => cells.is_empty(),
            MutationKind::Delete(_) => false,
        }
    }
}
