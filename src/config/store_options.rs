use crate::{
    config::{Configuration, keys},
    util::Result,
};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// fsync the WAL after every batch
    /// Default: false
    pub sync: bool,
    /// Rewrite the WAL on close once it grows past this many bytes
    /// Default: 64MB
    pub wal_compact_bytes: u64,
    /// Rows a scanner fetches per batch
    /// Default: 100
    pub scanner_caching: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            sync: false,
            wal_compact_bytes: 64 * 1024 * 1024,
            scanner_caching: 100,
        }
    }
}

impl StoreOptions {
    pub fn from_configuration(conf: &Configuration) -> Result<Self> {
        let defaults = StoreOptions::default();
        Ok(StoreOptions {
            sync: conf.get_bool(keys::WAL_SYNC, defaults.sync)?,
            wal_compact_bytes: conf
                .get_usize(keys::WAL_COMPACT_BYTES, defaults.wal_compact_bytes as usize)?
                as u64,
            scanner_caching: conf
                .get_usize(keys::SCANNER_CACHING, defaults.scanner_caching)?
                .max(1),
        })
    }
}
