//! Error types for the content layer.
//!
//! Store failures are wrapped with the operation and target they occurred on,
//! so a message read by a person says what was being attempted.

use thiserror::Error;

/// The unified error type for content operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A read or query failed.
    #[error("failed to read {target}: {source}")]
    Read {
        target: String,
        source: folio_core::Error,
    },

    /// A create, update or delete failed.
    #[error("failed to write {target}: {source}")]
    Write {
        target: String,
        source: folio_core::Error,
    },

    /// A batch of writes was rejected. None of its writes were applied.
    #[error("batch write failed: {source}")]
    Batch { source: folio_core::Error },

    /// A live subscription could not be opened or was terminated.
    #[error("subscription to {target} failed: {source}")]
    Subscription {
        target: String,
        source: folio_core::Error,
    },

    /// Record data does not satisfy the collection's schema.
    #[error("invalid record for {collection}: {reason}")]
    InvalidRecord { collection: String, reason: String },

    /// Query parameters are invalid (zero page size, mismatched cursor).
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl Error {
    pub(crate) fn read(target: impl ToString, source: folio_core::Error) -> Self {
        Error::Read {
            target: target.to_string(),
            source,
        }
    }

    pub(crate) fn write(target: impl ToString, source: folio_core::Error) -> Self {
        Error::Write {
            target: target.to_string(),
            source,
        }
    }

    pub(crate) fn subscription(target: impl ToString, source: folio_core::Error) -> Self {
        Error::Subscription {
            target: target.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_record(collection: impl ToString, reason: impl ToString) -> Self {
        Error::InvalidRecord {
            collection: collection.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The underlying store error, if any.
    pub fn store_error(&self) -> Option<&folio_core::Error> {
        match self {
            Error::Read { source, .. }
            | Error::Write { source, .. }
            | Error::Batch { source }
            | Error::Subscription { source, .. } => Some(source),
            Error::InvalidRecord { .. } | Error::InvalidQuery(_) => None,
        }
    }

    /// Returns true if a write precondition failed (a concurrent change).
    pub fn is_conflict(&self) -> bool {
        self.store_error().is_some_and(|e| e.is_conflict())
    }

    /// Returns true if the target document does not exist.
    pub fn is_not_found(&self) -> bool {
        self.store_error().is_some_and(|e| e.is_not_found())
    }
}
