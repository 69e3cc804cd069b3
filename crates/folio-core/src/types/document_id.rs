//! Document id type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::segment_error;
use crate::error::{Error, InvalidInputError};

/// Length of store-generated document ids.
const GENERATED_ID_LEN: usize = 20;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Bytes at or above this are rejected so every character is equally likely.
const UNBIASED_LIMIT: u8 = (256 / ID_ALPHABET.len() * ID_ALPHABET.len()) as u8;

/// Byte offsets carrying the UUID version and variant bits.
const FIXED_UUID_BYTES: [usize; 2] = [6, 8];

/// A validated document id.
///
/// Ids are opaque strings, immutable once a document has been written.
///
/// # Example
///
/// ```
/// use folio_core::DocumentId;
///
/// let id = DocumentId::new("bravado-health").unwrap();
/// assert_eq!(id.as_str(), "bravado-health");
///
/// let generated = DocumentId::generate();
/// assert_eq!(generated.as_str().len(), 20);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new document id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, too long, contains `/`,
    /// or is a reserved name.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if let Some(reason) = segment_error(&s) {
            return Err(InvalidInputError::DocumentId { value: s, reason }.into());
        }
        Ok(Self(s))
    }

    /// Generate a random 20-character alphanumeric id.
    ///
    /// Characters are drawn uniformly from the random bytes of v4 UUIDs.
    pub fn generate() -> Self {
        let mut id = String::with_capacity(GENERATED_ID_LEN);
        while id.len() < GENERATED_ID_LEN {
            let uuid = Uuid::new_v4();
            let random = uuid
                .as_bytes()
                .iter()
                .enumerate()
                .filter(|(i, _)| !FIXED_UUID_BYTES.contains(i))
                .map(|(_, b)| *b);

            for byte in random {
                if id.len() == GENERATED_ID_LEN {
                    break;
                }
                if byte < UNBIASED_LIMIT {
                    id.push(ID_ALPHABET[byte as usize % ID_ALPHABET.len()] as char);
                }
            }
        }

        Self(id)
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        assert!(DocumentId::new("bravado-health").is_ok());
        assert!(DocumentId::new("Some id with spaces").is_ok());
    }

    #[test]
    fn invalid_ids() {
        assert!(DocumentId::new("").is_err());
        assert!(DocumentId::new("a/b").is_err());
        assert!(DocumentId::new("..").is_err());
    }

    #[test]
    fn generated_ids_are_distinct_and_valid() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(DocumentId::new(a.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_use_the_whole_alphabet_at_every_position() {
        assert_eq!(UNBIASED_LIMIT, 248);

        let ids: Vec<_> = (0..2000).map(|_| DocumentId::generate()).collect();
        for position in 0..GENERATED_ID_LEN {
            let seen: std::collections::HashSet<u8> =
                ids.iter().map(|id| id.as_str().as_bytes()[position]).collect();
            assert!(seen.len() > 50, "position {position} saw {} characters", seen.len());
        }
    }
}
