use std::{collections::VecDeque, sync::Arc};

use bytes::Bytes;
use tracing::debug;

use crate::{
    client::RowResult,
    schema::TableName,
    store::{ReadSpec, Store},
    util::{Result, next_row_key},
};

/// Lazy, ordered sequence of rows produced by a [`Scan`](crate::Scan)
///
/// Rows are fetched from the store `caching` at a time. Each batch resumes
/// strictly after the last row already returned, so writes made between
/// batches are seen by later batches.
pub struct RowScanner {
    store: Arc<Store>,
    table: TableName,
    spec: ReadSpec,
    next_start: Bytes,
    stop_row: Bytes,
    caching: usize,
    remaining: Option<usize>,
    buffer: VecDeque<RowResult>,
    exhausted: bool,
}

impl RowScanner {
    pub(crate) fn new(
        store: Arc<Store>,
        table: TableName,
        spec: ReadSpec,
        start_row: Bytes,
        stop_row: Bytes,
        caching: usize,
        limit: Option<usize>,
    ) -> Self {
        RowScanner {
            store,
            table,
            spec,
            next_start: start_row,
            stop_row,
            caching: caching.max(1),
            remaining: limit,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let want = match self.remaining {
            Some(left) => left.min(self.caching),
            None => self.caching,
        };
        if want == 0 {
            self.exhausted = true;
            return Ok(());
        }

        let rows = self.store.scan_rows(
            &self.table,
            &self.next_start,
            &self.stop_row,
            want,
            &self.spec,
        )?;
        debug!(table = %self.table, rows = rows.len(), "Fetched scan batch");

        if rows.len() < want {
            self.exhausted = true;
        }
        if let Some((last, _)) = rows.last() {
            self.next_start = next_row_key(last);
        }
        self.buffer
            .extend(rows.into_iter().map(|(row, cells)| RowResult::new(row, cells)));
        Ok(())
    }

    /// Stop the scan; later calls to `next` return `None`
    pub fn close(&mut self) {
        self.exhausted = true;
        self.buffer.clear();
    }
}

impl Iterator for RowScanner {
    type Item = Result<RowResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch() {
                self.close();
                return Some(Err(e));
            }
        }

        let row = self.buffer.pop_front()?;
        if let Some(left) = self.remaining.as_mut() {
            *left -= 1;
        }
        Some(Ok(row))
    }
}
