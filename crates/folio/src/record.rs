//! Flattened records.
//!
//! A [`Record`] is what consumers see: the document id, the bookkeeping
//! timestamps lifted out of the stored fields, the store's version token, and
//! the remaining open-ended body.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use folio_core::{Document, DocumentId, Fields, Value, from_fields};

/// Field holding the creation time.
pub const CREATED_AT: &str = "createdAt";

/// Field holding the last-modified time.
pub const UPDATED_AT: &str = "updatedAt";

/// Key the id occupies in a record's JSON form.
pub const ID_FIELD: &str = "id";

/// Keys callers cannot write; the service owns them.
pub(crate) const RESERVED_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT, UPDATED_AT];

/// A document flattened for consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: DocumentId,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Store update time, used as an expected version for conditional writes.
    pub version: DateTime<Utc>,
    pub fields: Fields,
}

impl Record {
    pub fn from_document(doc: Document) -> Self {
        let mut fields = doc.fields;
        let created_at = fields.remove(CREATED_AT).and_then(|v| timestamp(&v));
        let updated_at = fields.remove(UPDATED_AT).and_then(|v| timestamp(&v));

        Self {
            id: doc.path.id().clone(),
            created_at,
            updated_at,
            version: doc.update_time,
            fields,
        }
    }

    /// Look up a field, following dots into nested maps.
    pub fn get(&self, field_path: &str) -> Option<&Value> {
        folio_core::value::lookup(&self.fields, field_path)
    }

    /// The JSON shape consumers receive: `{ id, createdAt, updatedAt, ...fields }`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(ID_FIELD.to_string(), self.id.as_str().into());
        for (key, time) in [(CREATED_AT, self.created_at), (UPDATED_AT, self.updated_at)] {
            if let Some(time) = time {
                map.insert(key.to_string(), Value::Timestamp(time).to_json());
            }
        }
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Decode the body into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        from_fields(&self.fields)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(t) => Some(*t),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}

/// A typed record.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub id: DocumentId,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: DateTime<Utc>,
    pub data: T,
}

impl<T: DeserializeOwned> Stored<T> {
    pub fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: record.id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
            data: record.decode()?,
        })
    }
}
