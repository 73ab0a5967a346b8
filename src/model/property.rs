//! Serialized property bags and their lazily converted view.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::convert::PropertyConverter;
use crate::{Error, Result};
use super::Value;

/// A map of property names to decoded values.
pub type PropertyMap = HashMap<String, Value>;

/// One property as stored in the projection: raw JSON value plus type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPropertyValue {
    pub value: serde_json::Value,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl SerializedPropertyValue {
    pub fn new(value: serde_json::Value, type_name: impl Into<String>) -> Self {
        Self { value, type_name: type_name.into() }
    }
}

/// The `properties` column, parsed but not yet converted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedPropertyValues(BTreeMap<String, SerializedPropertyValue>);

impl SerializedPropertyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON object form. An empty JSON array is accepted as the
    /// empty bag, since some writers encode empty maps that way.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "[]" {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed).map_err(|e| Error::MalformedProperties(e.to_string()))
    }

    pub fn with(mut self, name: impl Into<String>, value: SerializedPropertyValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SerializedPropertyValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SerializedPropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lazily converted property collection.
///
/// Values are converted through the [`PropertyConverter`] on first access
/// and cached. Clones share the serialized data and the cache.
#[derive(Clone)]
pub struct PropertyCollection {
    serialized: Arc<SerializedPropertyValues>,
    converter: Arc<dyn PropertyConverter>,
    converted: Arc<RwLock<PropertyMap>>,
}

impl PropertyCollection {
    pub fn new(serialized: SerializedPropertyValues, converter: Arc<dyn PropertyConverter>) -> Self {
        Self {
            serialized: Arc::new(serialized),
            converter,
            converted: Arc::new(RwLock::new(PropertyMap::new())),
        }
    }

    /// Converted value of `name`, or `None` if the property is not set.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        if let Some(v) = self.converted.read().get(name) {
            return Ok(Some(v.clone()));
        }
        let Some(raw) = self.serialized.get(name) else {
            return Ok(None);
        };
        let value = self.converter.deserialize_property_value(name, raw)?;
        self.converted.write().insert(name.to_owned(), value.clone());
        Ok(Some(value))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.serialized.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.serialized.names()
    }

    pub fn len(&self) -> usize {
        self.serialized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serialized.is_empty()
    }

    pub fn serialized(&self) -> &SerializedPropertyValues {
        &self.serialized
    }

    /// Convert everything. Fails on the first property that does not convert.
    pub fn to_map(&self) -> Result<PropertyMap> {
        let mut map = PropertyMap::with_capacity(self.len());
        for name in self.names() {
            if let Some(value) = self.get(name)? {
                map.insert(name.to_owned(), value);
            }
        }
        Ok(map)
    }
}

/// Equal when the serialized data is equal; the conversion cache is ignored.
impl PartialEq for PropertyCollection {
    fn eq(&self, other: &Self) -> bool {
        self.serialized == other.serialized
    }
}

impl fmt::Debug for PropertyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCollection")
            .field("serialized", &self.serialized)
            .field("converted", &self.converted.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::DefaultPropertyConverter;

    #[test]
    fn test_parse_serialized() {
        let values = SerializedPropertyValues::from_json_str(
            r#"{"title":{"value":"Hello","type":"string"},"count":{"value":3,"type":"int"}}"#,
        )
        .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("count").unwrap().type_name, "int");
    }

    #[test]
    fn test_empty_forms() {
        assert!(SerializedPropertyValues::from_json_str("[]").unwrap().is_empty());
        assert!(SerializedPropertyValues::from_json_str("{}").unwrap().is_empty());
        assert!(SerializedPropertyValues::from_json_str("  ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            SerializedPropertyValues::from_json_str(r#"{"title":"no type"}"#),
            Err(Error::MalformedProperties(_))
        ));
    }

    #[test]
    fn test_lazy_conversion_is_cached() {
        let serialized = SerializedPropertyValues::new()
            .with("title", SerializedPropertyValue::new(serde_json::json!("Hi"), "string"));
        let props = PropertyCollection::new(serialized, Arc::new(DefaultPropertyConverter));
        assert_eq!(props.converted.read().len(), 0);
        assert_eq!(props.get("title").unwrap(), Some(Value::from("Hi")));
        assert_eq!(props.converted.read().len(), 1);
        assert_eq!(props.get("missing").unwrap(), None);
    }
}
