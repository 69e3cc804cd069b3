//! Documents and writes.

use chrono::{DateTime, Utc};

use crate::error::{Error, InvalidInputError};
use crate::types::DocumentPath;
use crate::value::wire::{self, WireDocument};
use crate::value::{Fields, Value};

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
    pub create_time: DateTime<Utc>,
    /// Last write time; doubles as the optimistic-concurrency version.
    pub update_time: DateTime<Utc>,
}

impl Document {
    /// Look up a field by dotted path.
    pub fn get(&self, field_path: &str) -> Option<&Value> {
        crate::value::lookup(&self.fields, field_path)
    }

    /// Encode for storage or transport.
    pub fn to_wire(&self) -> Result<WireDocument, Error> {
        Ok(WireDocument {
            name: self.path.to_string(),
            fields: wire::encode_fields(&self.fields)?,
            create_time: Some(wire::format_timestamp(&self.create_time)),
            update_time: Some(wire::format_timestamp(&self.update_time)),
        })
    }

    /// Decode a wire document; `path` overrides the resource name.
    pub fn from_wire(path: DocumentPath, doc: &WireDocument) -> Result<Self, Error> {
        let create_time = required_time(doc.create_time.as_deref(), "createTime")?;
        let update_time = required_time(doc.update_time.as_deref(), "updateTime")?;
        Ok(Document {
            path,
            fields: wire::decode_fields(&doc.fields)?,
            create_time,
            update_time,
        })
    }
}

fn required_time(text: Option<&str>, name: &str) -> Result<DateTime<Utc>, Error> {
    let text =
        text.ok_or_else(|| InvalidInputError::value(format!("document is missing {}", name)))?;
    wire::parse_timestamp(text)
}

/// A condition a write requires of the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The document must (or must not) exist.
    Exists(bool),
    /// The document must exist with exactly this update time.
    UpdateTime(DateTime<Utc>),
}

/// One write in an atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Replace the whole document, creating it if needed.
    Set {
        path: DocumentPath,
        fields: Fields,
        precondition: Option<Precondition>,
    },
    /// Merge top-level fields into an existing document.
    Update {
        path: DocumentPath,
        fields: Fields,
        precondition: Option<Precondition>,
    },
    /// Remove the document. Deleting a missing document succeeds.
    Delete { path: DocumentPath },
}

impl Write {
    pub fn path(&self) -> &DocumentPath {
        match self {
            Write::Set { path, .. } | Write::Update { path, .. } | Write::Delete { path } => path,
        }
    }
}

/// Separate server-timestamp sentinels from ordinary field values.
///
/// Returns the remaining fields and the names of the fields the store must
/// set to its commit time. Sentinels are only accepted at the top level.
pub fn split_server_timestamps(fields: &Fields) -> Result<(Fields, Vec<String>), Error> {
    let mut plain = Fields::new();
    let mut transforms = Vec::new();

    for (name, value) in fields {
        if matches!(value, Value::ServerTimestamp) {
            transforms.push(name.clone());
        } else {
            if contains_server_timestamp(value) {
                return Err(InvalidInputError::value(format!(
                    "field '{}' contains a nested server timestamp",
                    name
                ))
                .into());
            }
            plain.insert(name.clone(), value.clone());
        }
    }

    Ok((plain, transforms))
}

fn contains_server_timestamp(value: &Value) -> bool {
    match value {
        Value::ServerTimestamp => true,
        Value::Array(items) => items.iter().any(contains_server_timestamp),
        Value::Map(fields) => fields.values().any(contains_server_timestamp),
        _ => false,
    }
}
