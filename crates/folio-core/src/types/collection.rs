//! Collection name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::segment_error;
use crate::error::{Error, InvalidInputError};

/// A validated collection name.
///
/// Collections are named buckets of documents, schemaless from the store's
/// point of view.
///
/// # Example
///
/// ```
/// use folio_core::CollectionName;
///
/// let collection = CollectionName::new("caseStudies").unwrap();
/// assert_eq!(collection.as_str(), "caseStudies");
/// assert!(CollectionName::new("a/b").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Create a new collection name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, too long, contains `/`,
    /// or is a reserved name.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = segment_error(&s) {
            return Err(InvalidInputError::CollectionName { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// Returns the collection name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(CollectionName::new("caseStudies").is_ok());
        assert!(CollectionName::new("case-studies_2").is_ok());
        assert!(CollectionName::new("__x").is_ok());
    }

    #[test]
    fn invalid_names() {
        assert!(CollectionName::new("").is_err());
        assert!(CollectionName::new(".").is_err());
        assert!(CollectionName::new("..").is_err());
        assert!(CollectionName::new("a/b").is_err());
        assert!(CollectionName::new("__internal__").is_err());
        assert!(CollectionName::new("x".repeat(1501)).is_err());
    }

    #[test]
    fn serde_validates() {
        let name: CollectionName = serde_json::from_str("\"caseStudies\"").unwrap();
        assert_eq!(name.as_str(), "caseStudies");
        assert!(serde_json::from_str::<CollectionName>("\"a/b\"").is_err());
    }
}
