//! Property conversion: serialized property values to [`Value`]s.
//!
//! The factory never converts eagerly; a [`PropertyCollection`] calls the
//! converter the first time a property is read.
//!
//! [`PropertyCollection`]: crate::model::PropertyCollection

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{SerializedPropertyValue, Value};
use crate::{Error, Result};

/// Turns one serialized property into a typed value.
///
/// Implementations are shared across threads and must be read-only.
pub trait PropertyConverter: Send + Sync {
    fn deserialize_property_value(
        &self,
        property: &str,
        serialized: &SerializedPropertyValue,
    ) -> Result<Value>;
}

/// Converter for the built-in serialized type tags.
///
/// | type tag | result |
/// |----------|--------|
/// | `string` | `Value::String` |
/// | `int`, `integer` | `Value::Int` |
/// | `float` | `Value::Float` |
/// | `boolean`, `bool` | `Value::Bool` |
/// | `array`, `array<…>` | `Value::List` |
/// | `DateTime`, `DateTimeImmutable`, `DateTimeInterface` | `Value::DateTime` / `Value::Date` |
///
/// Unknown tags (value objects, references to assets, ...) are passed
/// through structurally. `null` is always accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPropertyConverter;

impl PropertyConverter for DefaultPropertyConverter {
    fn deserialize_property_value(
        &self,
        property: &str,
        serialized: &SerializedPropertyValue,
    ) -> Result<Value> {
        use serde_json::Value as Json;

        let raw = &serialized.value;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let mismatch = || Error::PropertyConversion {
            property: property.to_owned(),
            message: format!("value {raw} does not match type {}", serialized.type_name),
        };

        let type_name = serialized.type_name.trim_start_matches('?');
        match type_name {
            "string" => raw.as_str().map(Value::from).ok_or_else(mismatch),
            "int" | "integer" => raw.as_i64().map(Value::Int).ok_or_else(mismatch),
            "float" | "double" => raw.as_f64().map(Value::Float).ok_or_else(mismatch),
            "boolean" | "bool" => raw.as_bool().map(Value::Bool).ok_or_else(mismatch),
            "DateTime" | "DateTimeImmutable" | "DateTimeInterface" | "\\DateTime"
            | "\\DateTimeImmutable" | "\\DateTimeInterface" => {
                let text = raw.as_str().ok_or_else(mismatch)?;
                parse_temporal(text).ok_or_else(|| Error::PropertyConversion {
                    property: property.to_owned(),
                    message: format!("unparseable date {text:?}"),
                })
            }
            t if t == "array" || t.starts_with("array<") => match raw {
                Json::Array(items) => Ok(Value::List(items.iter().map(Value::from).collect())),
                // Maps serialized as JSON objects keep their keys.
                Json::Object(_) => Ok(Value::from(raw)),
                _ => Err(mismatch()),
            },
            _ => Ok(Value::from(raw)),
        }
    }
}

/// RFC 3339 timestamps become `DateTime`, bare `YYYY-MM-DD` becomes `Date`.
fn parse_temporal(text: &str) -> Option<Value> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::DateTime(dt.with_timezone(&Utc)));
    }
    // PHP's DATE_W3C without fractional seconds but with a numeric offset
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(Value::DateTime(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(Value::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn convert(value: serde_json::Value, type_name: &str) -> Result<Value> {
        DefaultPropertyConverter
            .deserialize_property_value("p", &SerializedPropertyValue::new(value, type_name))
    }

    #[test]
    fn test_scalars() {
        assert_eq!(convert(json!("x"), "string").unwrap(), Value::from("x"));
        assert_eq!(convert(json!(7), "int").unwrap(), Value::Int(7));
        assert_eq!(convert(json!(1.5), "float").unwrap(), Value::Float(1.5));
        assert_eq!(convert(json!(true), "boolean").unwrap(), Value::Bool(true));
        assert_eq!(convert(json!(null), "string").unwrap(), Value::Null);
    }

    #[test]
    fn test_mismatch_is_error() {
        assert!(matches!(
            convert(json!("seven"), "int"),
            Err(Error::PropertyConversion { .. })
        ));
    }

    #[test]
    fn test_datetime() {
        let expected = Utc.with_ymd_and_hms(2020, 8, 20, 16, 56, 15).unwrap();
        assert_eq!(
            convert(json!("2020-08-20T18:56:15+02:00"), "DateTimeImmutable").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            convert(json!("2014-09-23"), "DateTime").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2014, 9, 23).unwrap())
        );
    }

    #[test]
    fn test_array_and_passthrough() {
        assert_eq!(
            convert(json!(["a", "b"]), "array<string>").unwrap(),
            Value::from(vec!["a", "b"])
        );
        assert_eq!(
            convert(json!({"__identifier": "abc"}), "Acme\\Asset").unwrap(),
            Value::Map([("__identifier".to_owned(), Value::from("abc"))].into_iter().collect())
        );
    }
}
