use std::fmt;

use bytes::Bytes;

use crate::util::{Printable, Result, Status};

/// Kind of a stored cell
///
/// Delete kinds are markers: they carry no value and mask older puts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellType {
    Put = 4,
    /// Masks exactly one version of a column
    Delete = 8,
    /// Masks every version of a column at or below the marker timestamp
    DeleteColumn = 12,
    /// Masks every column of a family at or below the marker timestamp
    DeleteFamily = 14,
}

impl CellType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            4 => Some(CellType::Put),
            8 => Some(CellType::Delete),
            12 => Some(CellType::DeleteColumn),
            14 => Some(CellType::DeleteFamily),
            _ => None,
        }
    }

    pub fn is_delete(self) -> bool {
        self != CellType::Put
    }
}

/// One (row, family, qualifier, timestamp) coordinate and its value
#[derive(Clone, PartialEq, Eq)]
pub struct Cell {
    row: Bytes,
    family: Bytes,
    qualifier: Bytes,
    timestamp: u64,
    cell_type: CellType,
    value: Bytes,
}

impl Cell {
    pub fn new(
        row: Bytes,
        family: Bytes,
        qualifier: Bytes,
        timestamp: u64,
        cell_type: CellType,
        value: Bytes,
    ) -> Self {
        Cell {
            row,
            family,
            qualifier,
            timestamp,
            cell_type,
            value,
        }
    }

    pub fn put(row: Bytes, family: Bytes, qualifier: Bytes, timestamp: u64, value: Bytes) -> Self {
        Cell::new(row, family, qualifier, timestamp, CellType::Put, value)
    }

    pub fn marker(
        row: Bytes,
        family: Bytes,
        qualifier: Bytes,
        timestamp: u64,
        cell_type: CellType,
    ) -> Result<Self> {
        if !cell_type.is_delete() {
            return Err(Status::invalid_argument("Delete marker must have a delete type"));
        }
        Ok(Cell::new(
            row,
            family,
            qualifier,
            timestamp,
            cell_type,
            Bytes::new(),
        ))
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn family(&self) -> &Bytes {
        &self.family
    }

    pub fn qualifier(&self) -> &Bytes {
        &self.qualifier
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn is_delete(&self) -> bool {
        self.cell_type.is_delete()
    }

    /// True if both cells address the same family and qualifier
    pub fn same_column(&self, other: &Cell) -> bool {
        self.family == other.family && self.qualifier == other.qualifier
    }

    pub(crate) fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Approximate in-memory footprint
    pub fn heap_size(&self) -> usize {
        self.row.len() + self.family.len() + self.qualifier.len() + self.value.len() + 8
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{}/{:?}/vlen={}",
            Printable(&self.row),
            Printable(&self.family),
            Printable(&self.qualifier),
            self.timestamp,
            self.cell_type,
            self.value.len()
        )
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("row", &Printable(&self.row))
            .field("family", &Printable(&self.family))
            .field("qualifier", &Printable(&self.qualifier))
            .field("timestamp", &self.timestamp)
            .field("type", &self.cell_type)
            .field("value", &Printable(&self.value))
            .finish()
    }
}
