//! Document path type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{CollectionName, DocumentId};
use crate::error::{Error, InvalidInputError};

/// The location of a single document: `<collection>/<id>`.
///
/// # Example
///
/// ```
/// use folio_core::DocumentPath;
///
/// let path = DocumentPath::parse("caseStudies/bravado-health").unwrap();
/// assert_eq!(path.collection().as_str(), "caseStudies");
/// assert_eq!(path.id().as_str(), "bravado-health");
/// assert_eq!(path.to_string(), "caseStudies/bravado-health");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionName,
    id: DocumentId,
}

impl DocumentPath {
    /// Create a document path from its components.
    pub fn new(collection: CollectionName, id: DocumentId) -> Self {
        Self { collection, id }
    }

    /// Parse a `<collection>/<id>` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not have exactly two valid segments.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();

        let (collection, id) = s.split_once('/').ok_or_else(|| InvalidInputError::DocumentPath {
            value: s.to_string(),
            reason: "must have format '<collection>/<id>'".to_string(),
        })?;

        let collection =
            CollectionName::new(collection).map_err(|_| InvalidInputError::DocumentPath {
                value: s.to_string(),
                reason: format!("invalid collection: {}", collection),
            })?;

        let id = DocumentId::new(id).map_err(|_| InvalidInputError::DocumentPath {
            value: s.to_string(),
            reason: format!("invalid document id: {}", id),
        })?;

        Ok(Self { collection, id })
    }

    /// Returns the collection.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Returns the document id.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for DocumentPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DocumentPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DocumentPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentPath::parse(&s).map_err(serde::de::Error::custom)
    }
}
