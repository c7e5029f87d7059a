use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    schema::{ColumnFamilyDescriptor, TableName},
    util::{Result, Status},
};

/// Schema of a table: its name and declared column families
///
/// Families are keyed by name, so adding a family twice keeps the last
/// definition.
///
/// # Example
///
/// ```
/// use cellstore::{ColumnFamilyDescriptor, TableDescriptor, TableName};
///
/// let mut extra = ColumnFamilyDescriptor::new("extra_info");
/// extra.set_versions(1, 3).unwrap();
///
/// let mut desc = TableDescriptor::new(TableName::value_of("t_phone_info").unwrap());
/// desc.add_family(ColumnFamilyDescriptor::new("base_info"))
///     .add_family(extra);
/// assert_eq!(desc.family_names(), vec!["base_info", "extra_info"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: TableName,
    families: BTreeMap<String, ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: TableName) -> Self {
        TableDescriptor {
            name,
            families: BTreeMap::new(),
        }
    }

    pub fn add_family(&mut self, family: ColumnFamilyDescriptor) -> &mut Self {
        self.families.insert(family.name().to_string(), family);
        self
    }

    pub fn remove_family(&mut self, name: &str) -> Option<ColumnFamilyDescriptor> {
        self.families.remove(name)
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn families(&self) -> impl Iterator<Item = &ColumnFamilyDescriptor> {
        self.families.values()
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// Look a family up by its raw name bytes, as carried by cells
    pub fn family(&self, name: &[u8]) -> Option<&ColumnFamilyDescriptor> {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.families.get(name))
    }

    pub fn has_family(&self, name: &[u8]) -> bool {
        self.family(name).is_some()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.families.is_empty() {
            return Err(Status::invalid_argument(format!(
                "Table {} must declare at least one column family",
                self.name
            )));
        }
        self.families().try_for_each(ColumnFamilyDescriptor::validate)
    }
}
