//! Error types for document store operations.
//!
//! Every backend reports failures through [`Error`], with explicit variants
//! for transport, protocol, validation and document-state failures so callers
//! can tell a missing document apart from a stale write or a dead network.

use std::fmt;
use thiserror::Error;

/// The unified error type for store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error responses returned by a remote store.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad collection name, document id, cursor).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The document a write depends on does not exist.
    #[error("document not found: {path}")]
    NotFound { path: String },

    /// A write precondition did not hold (the document changed since it was read,
    /// or a create targeted an existing document).
    #[error("write precondition failed for {path}")]
    Conflict { path: String },

    /// Local storage failure (filesystem, lock, corrupt document).
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// Returns true if this error means the target document does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Protocol(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if this error is a failed write precondition.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Conflict { .. } => true,
            Error::Protocol(e) => e.is_conflict(),
            _ => false,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::storage(format!("IO error: {}", err))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// An error response from a remote store.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical status string (e.g. `NOT_FOUND`, `FAILED_PRECONDITION`).
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if the server reported a missing document.
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_deref() == Some("NOT_FOUND")
    }

    /// Check if the server rejected a write precondition.
    pub fn is_conflict(&self) -> bool {
        self.status == 409
            || matches!(
                self.code.as_deref(),
                Some("FAILED_PRECONDITION") | Some("ALREADY_EXISTS") | Some("ABORTED")
            )
    }

    /// Check if this is an authentication or permission error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
            || self.status == 403
            || matches!(
                self.code.as_deref(),
                Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED")
            )
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid collection name.
    #[error("invalid collection name '{value}': {reason}")]
    CollectionName { value: String, reason: String },

    /// Invalid document id.
    #[error("invalid document id '{value}': {reason}")]
    DocumentId { value: String, reason: String },

    /// Invalid `collection/id` document path.
    #[error("invalid document path '{value}': {reason}")]
    DocumentPath { value: String, reason: String },

    /// Invalid store URL.
    #[error("invalid store URL '{value}': {reason}")]
    StoreUrl { value: String, reason: String },

    /// A value that cannot be stored or decoded.
    #[error("invalid value: {reason}")]
    Value { reason: String },

    /// A malformed or mismatched pagination cursor.
    #[error("invalid cursor: {reason}")]
    Cursor { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

impl InvalidInputError {
    pub fn value(reason: impl Into<String>) -> Self {
        InvalidInputError::Value {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(
            404,
            Some("NOT_FOUND".to_string()),
            Some("no entity".to_string()),
        );
        assert_eq!(err.to_string(), "HTTP 404 [NOT_FOUND]: no entity");
    }

    #[test]
    fn classifies_protocol_errors() {
        let missing: Error = ProtocolError::new(404, None, None).into();
        assert!(missing.is_not_found());
        assert!(!missing.is_conflict());

        let stale: Error =
            ProtocolError::new(400, Some("FAILED_PRECONDITION".to_string()), None).into();
        assert!(stale.is_conflict());

        let denied = ProtocolError::new(403, Some("PERMISSION_DENIED".to_string()), None);
        assert!(denied.is_auth_error());
    }
}
