//! Raw projection rows.
//!
//! A row is a flat map of column name to nullable string, exactly as the
//! query layer hands it over. Typed decoding happens in the factory.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column names of the projection row shape.
pub mod columns {
    pub const CONTENT_STREAM_ID: &str = "contentstreamidentifier";
    pub const DIMENSION_SPACE_POINT: &str = "dimensionspacepoint";
    pub const ORIGIN_DIMENSION_SPACE_POINT: &str = "origindimensionspacepoint";
    pub const NODE_AGGREGATE_ID: &str = "nodeaggregateidentifier";
    pub const CLASSIFICATION: &str = "classification";
    pub const NODE_TYPE_NAME: &str = "nodetypename";
    pub const NODE_NAME: &str = "nodename";
    pub const PROPERTIES: &str = "properties";
    pub const PARENT_NODE_AGGREGATE_ID: &str = "parentnodeaggregateidentifier";
    pub const LEVEL: &str = "level";
    pub const DISABLED_DIMENSION_SPACE_POINT_HASH: &str = "disableddimensionspacepointhash";
    pub const REFERENCE_NAME: &str = "referencename";
    pub const REFERENCE_PROPERTIES: &str = "referenceproperties";
}

/// One projection row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: HashMap<String, Option<String>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(column.into(), Some(value.into()));
        self
    }

    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.columns.insert(column.into(), None);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: Option<String>) {
        self.columns.insert(column.into(), value);
    }

    /// Build a row from a JSON object as returned by JSON-speaking drivers.
    ///
    /// Strings are kept, numbers and booleans are stringified, `null` is
    /// NULL, and nested objects/arrays (jsonb columns) are re-serialized.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(object) = value else {
            return Err(Error::InvalidColumn {
                column: "*".into(),
                message: "row must be a JSON object".into(),
            });
        };
        let columns = object
            .into_iter()
            .map(|(column, value)| {
                let value = match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Bool(b) => Some(b.to_string()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    nested => Some(nested.to_string()),
                };
                (column, value)
            })
            .collect();
        Ok(Self { columns })
    }

    /// Value of `column`; `None` if absent or NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).and_then(|v| v.as_deref())
    }

    /// Like [`Row::get`], but empty strings count as absent too.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    /// Mandatory column.
    pub fn require(&self, column: &'static str) -> Result<&str> {
        self.get(column).ok_or(Error::MissingColumn(column))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), Some(v.into()))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_empty() {
        let row = Row::new().with_null(columns::NODE_NAME).with(columns::LEVEL, "");
        assert_eq!(row.get(columns::NODE_NAME), None);
        assert_eq!(row.get(columns::LEVEL), Some(""));
        assert_eq!(row.non_empty(columns::LEVEL), None);
        assert!(row.contains(columns::NODE_NAME));
    }

    #[test]
    fn test_require() {
        let row = Row::new();
        assert!(matches!(
            row.require(columns::NODE_TYPE_NAME),
            Err(Error::MissingColumn("nodetypename"))
        ));
    }

    #[test]
    fn test_from_json() {
        let row = Row::from_json(serde_json::json!({
            "level": 2,
            "nodename": null,
            "dimensionspacepoint": {"language": "de"},
            "nodeaggregateidentifier": "a"
        }))
        .unwrap();
        assert_eq!(row.get("level"), Some("2"));
        assert_eq!(row.get("nodename"), None);
        assert_eq!(row.get("dimensionspacepoint"), Some(r#"{"language":"de"}"#));
        assert_eq!(row.get("nodeaggregateidentifier"), Some("a"));
        assert!(Row::from_json(serde_json::json!([1])).is_err());
    }
}
