use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Property names understood by the client
pub mod keys {
    /// Comma-separated `host:port` list of bootstrap coordinators
    pub const QUORUM: &str = "cellstore.quorum";
    /// Directory holding the catalog and the WAL
    pub const ROOT_DIR: &str = "cellstore.rootdir";
    /// fsync the WAL after every batch
    pub const WAL_SYNC: &str = "cellstore.wal.sync";
    /// WAL size in bytes above which close rewrites the log
    pub const WAL_COMPACT_BYTES: &str = "cellstore.wal.compact.bytes";
    /// Rows fetched per scanner batch
    pub const SCANNER_CACHING: &str = "cellstore.client.scanner.caching";
}

/// Flat string key-value properties handed to the connection factory
///
/// ```
/// use cellstore::Configuration;
///
/// let mut conf = Configuration::create();
/// conf.set("cellstore.quorum", "node01:2181,node02:2181");
/// assert_eq!(conf.get("cellstore.quorum"), Some("node01:2181,node02:2181"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    props: BTreeMap<String, String>,
}

impl Configuration {
    /// Empty configuration; every optional key falls back to its default
    pub fn create() -> Self {
        Configuration::default()
    }

    /// Load a flat JSON object of string properties
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref()).map_err(|e| {
            Status::io_error(format!(
                "Failed to read configuration {}: {e}",
                path.as_ref().display()
            ))
        })?;
        serde_json::from_slice(&data).map_err(|e| {
            Status::invalid_argument(format!(
                "Bad configuration {}: {e}",
                path.as_ref().display()
            ))
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Status::invalid_argument(format!("Missing required property {key}")))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        self.get_parsed(key, default)
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize> {
        self.get_parsed(key, default)
    }

    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                Status::invalid_argument(format!("Property {key} has unparsable value {raw:?}"))
            }),
        }
    }

    /// Parsed bootstrap coordinator list
    pub fn quorum(&self) -> Result<Vec<Coordinator>> {
        self.require(keys::QUORUM)?
            .split(',')
            .map(|entry| entry.trim().parse())
            .collect()
    }
}

/// One `host:port` bootstrap address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinator {
    pub host: String,
    pub port: u16,
}

impl FromStr for Coordinator {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Status::invalid_argument(format!("Bad coordinator address {s:?}"));

        let (host, port) = s.rsplit_once(':').ok_or_else(bad)?;
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(bad());
        }
        let port = port.parse::<u16>().map_err(|_| bad())?;
        if port == 0 {
            return Err(bad());
        }

        Ok(Coordinator {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
