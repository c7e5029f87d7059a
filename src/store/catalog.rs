use std::{collections::BTreeMap, fs, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cell::Cell,
    memstore::MemStore,
    schema::{TableDescriptor, TableName},
    util::{Result, Status},
    wal::WalEdit,
};

/// Runtime state of one table
#[derive(Debug)]
pub(crate) struct TableState {
    pub descriptor: TableDescriptor,
    pub enabled: bool,
    pub memstore: Arc<MemStore>,
}

impl TableState {
    fn new(descriptor: TableDescriptor) -> Self {
        TableState {
            descriptor,
            enabled: true,
            memstore: Arc::new(MemStore::new()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    tables: Vec<CatalogEntry>,
}

#[derive(Serialize, Deserialize)]
struct CatalogEntry {
    descriptor: TableDescriptor,
    enabled: bool,
}

/// Every table the store knows about, keyed by name
///
/// Edits are applied as absolute state changes (create replaces, delete of
/// a missing table is ignored), so replaying a WAL over a catalog snapshot
/// that is newer than the log start converges to the logged state.
#[derive(Default)]
pub(crate) struct Catalog {
    tables: BTreeMap<TableName, TableState>,
}

impl Catalog {
    /// Load a catalog snapshot; a missing file is an empty catalog
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Catalog::default());
        }
        let data = fs::read(path)?;
        let file: CatalogFile = serde_json::from_slice(&data)?;

        let mut catalog = Catalog::default();
        for entry in file.tables {
            let mut state = TableState::new(entry.descriptor);
            state.enabled = entry.enabled;
            catalog
                .tables
                .insert(state.descriptor.name().clone(), state);
        }
        Ok(catalog)
    }

    /// Write a snapshot next to `path` and rename it into place
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = CatalogFile {
            tables: self
                .tables
                .values()
                .map(|t| CatalogEntry {
                    descriptor: t.descriptor.clone(),
                    enabled: t.enabled,
                })
                .collect(),
        };
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, name: &TableName) -> Option<&TableState> {
        self.tables.get(name)
    }

    pub fn require(&self, name: &TableName) -> Result<&TableState> {
        self.tables
            .get(name)
            .ok_or_else(|| Status::table_not_found(name))
    }

    pub fn require_enabled(&self, name: &TableName) -> Result<&TableState> {
        let state = self.require(name)?;
        if !state.enabled {
            return Err(Status::table_not_enabled(name));
        }
        Ok(state)
    }

    pub fn names(&self) -> Vec<TableName> {
        self.tables.keys().cloned().collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableState> {
        self.tables.values()
    }

    /// Approximate bytes held by every table's memstore
    pub fn memstore_bytes(&self) -> u64 {
        self.tables
            .values()
            .map(|t| t.memstore.approximate_memory_usage() as u64)
            .sum()
    }

    /// Apply a logged edit; returns the number of cells written
    pub fn apply(&mut self, edit: &WalEdit) -> usize {
        match edit {
            WalEdit::CreateTable(desc) => {
                self.tables
                    .insert(desc.name().clone(), TableState::new(desc.clone()));
            }
            WalEdit::ModifyTable(desc) => match self.tables.get_mut(desc.name()) {
                Some(state) => {
                    for dropped in state
                        .descriptor
                        .family_names()
                        .into_iter()
                        .filter(|f| !desc.has_family(f.as_bytes()))
                    {
                        // Decoding only fails on a corrupt key, which the
                        // next read reports.
                        let _ = state.memstore.remove_family(dropped.as_bytes());
                    }
                    state.descriptor = desc.clone();
                }
                None => {
                    self.tables
                        .insert(desc.name().clone(), TableState::new(desc.clone()));
                }
            }
            WalEdit::DeleteTable(name) => {
                self.tables.remove(name);
            }
            WalEdit::SetEnabled { table, enabled } => {
                if let Some(state) = self.tables.get_mut(table) {
                    state.enabled = *enabled;
                }
            }
            WalEdit::Truncate(name) => {
                if let Some(state) = self.tables.get_mut(name) {
                    state.memstore = Arc::new(MemStore::new());
                }
            }
            WalEdit::Mutation {
                table,
                sequence,
                cells,
            } => {
                return self.apply_cells(table, *sequence, cells);
            }
        }
        0
    }

    fn apply_cells(&self, table: &TableName, sequence: u64, cells: &[Cell]) -> usize {
        let Some(state) = self.tables.get(table) else {
            debug!(%table, "Skipping mutation for a table that no longer exists");
            return 0;
        };
        for (i, cell) in cells.iter().enumerate() {
            state.memstore.add(sequence + i as u64, cell);
        }
        cells.len()
    }
}
