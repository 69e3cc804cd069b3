//! Firestore REST typed-JSON encoding.
//!
//! Both the network store and the file store persist documents in this form,
//! so a file store root can be inspected with the same tooling as a remote
//! database export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};

use super::{Fields, Value};
use crate::error::{Error, InvalidInputError};

/// Encode a value as Firestore typed JSON.
///
/// # Errors
///
/// The server-timestamp sentinel has no value encoding; it must be split out
/// into a field transform before encoding.
pub fn encode_value(value: &Value) -> Result<serde_json::Value, Error> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Boolean(b) => json!({ "booleanValue": b }),
        Value::Integer(i) => json!({ "integerValue": i.to_string() }),
        Value::Double(d) => {
            if d.is_nan() {
                json!({ "doubleValue": "NaN" })
            } else if d.is_infinite() {
                let text = if *d > 0.0 { "Infinity" } else { "-Infinity" };
                json!({ "doubleValue": text })
            } else {
                json!({ "doubleValue": d })
            }
        }
        Value::Timestamp(t) => json!({ "timestampValue": format_timestamp(t) }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<_>, _>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields)? } }),
        Value::ServerTimestamp => {
            return Err(InvalidInputError::value(
                "server timestamps are only allowed as top-level field values",
            )
            .into());
        }
    };
    Ok(encoded)
}

/// Encode a field map as a Firestore `fields` object.
pub fn encode_fields(fields: &Fields) -> Result<Map<String, serde_json::Value>, Error> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), encode_value(value)?)))
        .collect()
}

/// Decode a Firestore typed-JSON value.
pub fn decode_value(json: &serde_json::Value) -> Result<Value, Error> {
    let object = json
        .as_object()
        .ok_or_else(|| InvalidInputError::value("typed value must be an object"))?;

    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| InvalidInputError::value("typed value is empty"))?;

    let value = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Boolean(
            inner
                .as_bool()
                .ok_or_else(|| InvalidInputError::value("booleanValue must be a boolean"))?,
        ),
        "integerValue" => {
            let parsed = match inner {
                serde_json::Value::String(s) => s.parse::<i64>().ok(),
                serde_json::Value::Number(n) => n.as_i64(),
                _ => None,
            };
            Value::Integer(
                parsed.ok_or_else(|| InvalidInputError::value("integerValue is not an i64"))?,
            )
        }
        "doubleValue" => {
            let parsed = match inner {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => match s.as_str() {
                    "NaN" => Some(f64::NAN),
                    "Infinity" => Some(f64::INFINITY),
                    "-Infinity" => Some(f64::NEG_INFINITY),
                    other => other.parse::<f64>().ok(),
                },
                _ => None,
            };
            Value::Double(
                parsed.ok_or_else(|| InvalidInputError::value("doubleValue is not a number"))?,
            )
        }
        "timestampValue" => {
            let text = inner
                .as_str()
                .ok_or_else(|| InvalidInputError::value("timestampValue must be a string"))?;
            Value::Timestamp(parse_timestamp(text)?)
        }
        // References, bytes and geo points are carried as their textual form.
        "stringValue" | "referenceValue" | "bytesValue" => Value::String(
            inner
                .as_str()
                .ok_or_else(|| InvalidInputError::value(format!("{} must be a string", kind)))?
                .to_string(),
        ),
        "geoPointValue" => Value::Map(
            inner
                .as_object()
                .map(|point| {
                    point
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::from_json(v.clone())))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Value::Array(values)
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(serde_json::Value::Object(fields)) => decode_fields(fields)?,
                _ => Fields::new(),
            };
            Value::Map(fields)
        }
        other => {
            return Err(InvalidInputError::value(format!("unknown value type '{}'", other)).into());
        }
    };
    Ok(value)
}

/// Decode a Firestore `fields` object.
pub fn decode_fields(fields: &Map<String, serde_json::Value>) -> Result<Fields, Error> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Format a timestamp the way the REST API does (RFC 3339, UTC, `Z` suffix).
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 timestamp.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| InvalidInputError::value(format!("bad timestamp '{}': {}", text, e)).into())
}

/// A document as the REST API returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    /// Full resource name, or `collection/id` in the file store.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encodes_each_value_type() {
        let ts = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let cases = vec![
            (Value::Null, json!({ "nullValue": null })),
            (Value::Boolean(true), json!({ "booleanValue": true })),
            (Value::Integer(42), json!({ "integerValue": "42" })),
            (Value::Double(1.5), json!({ "doubleValue": 1.5 })),
            (Value::Double(f64::INFINITY), json!({ "doubleValue": "Infinity" })),
            (
                Value::Timestamp(ts),
                json!({ "timestampValue": "2021-03-04T05:06:07Z" }),
            ),
            (Value::from("Bravado"), json!({ "stringValue": "Bravado" })),
            (
                Value::Array(vec![Value::Integer(1), Value::from("a")]),
                json!({ "arrayValue": { "values": [
                    { "integerValue": "1" },
                    { "stringValue": "a" }
                ] } }),
            ),
        ];

        for (value, expected) in cases {
            assert_eq!(encode_value(&value).unwrap(), expected);
            assert_eq!(decode_value(&expected).unwrap(), value);
        }
    }

    #[test]
    fn encodes_nested_map() {
        let mut inner = Fields::new();
        inner.insert("timeline".to_string(), Value::from("2018–2021"));
        let value = Value::Map(inner);

        let encoded = encode_value(&value).unwrap();
        assert_eq!(
            encoded,
            json!({ "mapValue": { "fields": {
                "timeline": { "stringValue": "2018–2021" }
            } } })
        );
    }

    #[test]
    fn decodes_empty_collections() {
        assert_eq!(
            decode_value(&json!({ "arrayValue": {} })).unwrap(),
            Value::Array(vec![])
        );
        assert_eq!(
            decode_value(&json!({ "mapValue": {} })).unwrap(),
            Value::Map(Fields::new())
        );
    }

    #[test]
    fn decodes_nan() {
        match decode_value(&json!({ "doubleValue": "NaN" })).unwrap() {
            Value::Double(d) => assert!(d.is_nan()),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn rejects_server_timestamp_and_unknown_types() {
        assert!(encode_value(&Value::ServerTimestamp).is_err());
        assert!(decode_value(&json!({ "weirdValue": 1 })).is_err());
        assert!(decode_value(&json!("plain")).is_err());
    }

    #[test]
    fn wire_document_uses_camel_case() {
        let doc: WireDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/caseStudies/x",
            "fields": { "company": { "stringValue": "Bravado Health" } },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00.123456Z"
        }))
        .unwrap();

        assert_eq!(doc.update_time.as_deref(), Some("2024-01-02T00:00:00.123456Z"));
        let fields = decode_fields(&doc.fields).unwrap();
        assert_eq!(fields["company"], Value::from("Bravado Health"));
    }
}
