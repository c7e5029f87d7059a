use std::fmt;

use bytes::Bytes;

use crate::cell::Cell;

/// Cells of one row, ordered by family, qualifier and newest version first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowResult {
    row: Bytes,
    cells: Vec<Cell>,
}

impl RowResult {
    pub(crate) fn new(row: Bytes, cells: Vec<Cell>) -> Self {
        RowResult { row, cells }
    }

    pub fn row(&self) -> &Bytes {
        &self.row
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Newest value of `family:qualifier`
    pub fn value(&self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> Option<&Bytes> {
        self.column_cells(family, qualifier)
            .next()
            .map(Cell::value)
    }

    /// Every returned version of `family:qualifier`, newest first
    pub fn column_cells(
        &self,
        family: impl AsRef<[u8]>,
        qualifier: impl AsRef<[u8]>,
    ) -> impl Iterator<Item = &Cell> {
        let family = Bytes::copy_from_slice(family.as_ref());
        let qualifier = Bytes::copy_from_slice(qualifier.as_ref());
        self.cells
            .iter()
            .filter(move |c| *c.family() == family && *c.qualifier() == qualifier)
    }

    pub fn contains_column(&self, family: impl AsRef<[u8]>, qualifier: impl AsRef<[u8]>) -> bool {
        self.column_cells(family, qualifier).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for RowResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cells.is_empty() {
            return write!(f, "keyvalues=NONE");
        }
        write!(f, "keyvalues={{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(qualifier: &'static [u8], ts: u64, value: &'static [u8]) -> Cell {
        Cell::put(
            Bytes::from_static(b"p001"),
            Bytes::from_static(b"base_info"),
            Bytes::from_static(qualifier),
            ts,
            Bytes::from_static(value),
        )
    }

    #[test]
    fn test_value_is_newest() {
        let result = RowResult::new(Bytes::from_static(b"p001"), vec![
            cell(b"brand", 9, b"Apple"),
            cell(b"name", 8, b"iPhone 15"),
            cell(b"name", 3, b"iPhone 14"),
        ]);

        assert_eq!(result.value("base_info", "name").unwrap().as_ref(), b"iPhone 15");
        assert_eq!(result.column_cells("base_info", "name").count(), 2);
        assert!(result.value("base_info", "color").is_none());
        assert!(!result.contains_column("extra_info", "name"));
    }

    #[test]
    fn test_display() {
        let empty = RowResult::default();
        assert_eq!(empty.to_string(), "keyvalues=NONE");

        let result = RowResult::new(Bytes::from_static(b"p001"), vec![cell(b"brand", 9, b"Apple")]);
        assert_eq!(
            result.to_string(),
            "keyvalues={p001/base_info:brand/9/Put/vlen=5}"
        );
    }
}
