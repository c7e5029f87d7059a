use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Fully qualified table name: `namespace:qualifier`
///
/// Tables created without a namespace live in [`DEFAULT_NAMESPACE`] and are
/// displayed by their bare qualifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName {
    namespace: String,
    qualifier: String,
}

impl TableName {
    /// Parse `qualifier` or `namespace:qualifier`.
    pub fn value_of(name: impl AsRef<[u8]>) -> Result<Self> {
        let name = std::str::from_utf8(name.as_ref())
            .map_err(|_| Status::invalid_argument("Table name is not valid UTF-8"))?;

        let (namespace, qualifier) = match name.split_once(':') {
            Some((ns, q)) => (ns, q),
            None => (DEFAULT_NAMESPACE, name),
        };

        validate_part("namespace", namespace)?;
        validate_part("qualifier", qualifier)?;
        if qualifier.starts_with('.') || qualifier.starts_with('-') {
            return Err(Status::invalid_argument(format!(
                "Table qualifier must not start with '.' or '-': {qualifier}"
            )));
        }

        Ok(TableName {
            namespace: namespace.to_string(),
            qualifier: qualifier.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// `namespace:qualifier`, always including the namespace
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.namespace, self.qualifier)
    }
}

fn validate_part(what: &str, part: &str) -> Result<()> {
    if part.is_empty() {
        return Err(Status::invalid_argument(format!("Table {what} is empty")));
    }
    if let Some(c) = part
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
    {
        return Err(Status::invalid_argument(format!(
            "Illegal character {c:?} in table {what}: {part}"
        )));
    }
    Ok(())
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace == DEFAULT_NAMESPACE {
            write!(f, "{}", self.qualifier)
        } else {
            write!(f, "{}:{}", self.namespace, self.qualifier)
        }
    }
}

impl TryFrom<String> for TableName {
    type Error = Status;

    fn try_from(value: String) -> Result<Self> {
        TableName::value_of(value)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.full_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace() {
        let name = TableName::value_of("t_phone_info").unwrap();
        assert_eq!(name.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(name.qualifier(), "t_phone_info");
        assert_eq!(name.to_string(), "t_phone_info");
        assert_eq!(name.full_name(), "default:t_phone_info");
    }

    #[test]
    fn test_explicit_namespace() {
        let name = TableName::value_of(b"shop:t_phone_info").unwrap();
        assert_eq!(name.namespace(), "shop");
        assert_eq!(name.to_string(), "shop:t_phone_info");
        assert_eq!(TableName::value_of(name.full_name()).unwrap(), name);
    }

    #[test]
    fn test_invalid_names() {
        assert!(TableName::value_of("").unwrap_err().is_invalid_argument());
        assert!(TableName::value_of("ns:").is_err());
        assert!(TableName::value_of("bad name").is_err());
        assert!(TableName::value_of("-table").is_err());
        assert!(TableName::value_of("a:b:c").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let name = TableName::value_of("t_phone_info").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"default:t_phone_info\"");
        let back: TableName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
