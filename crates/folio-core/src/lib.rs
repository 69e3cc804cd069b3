//! folio-core - Core document, query and store types.

pub mod document;
pub mod error;
pub mod query;
pub mod traits;
pub mod types;
pub mod value;

pub use document::{Document, Precondition, Write, split_server_timestamps};
pub use error::{Error, InvalidInputError, ProtocolError, TransportError};
pub use query::{Cursor, DOCUMENT_ID_FIELD, Direction, Filter, FilterOp, OrderBy, QuerySpec};
pub use traits::{DocumentStore, Listener, ListenerStream};
pub use types::{CollectionName, DocumentId, DocumentPath, StoreUrl};
pub use value::{Fields, Value, from_fields, to_fields};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
