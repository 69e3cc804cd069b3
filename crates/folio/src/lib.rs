//! folio - Portfolio content layer
//!
//! This library provides the data-access layer for case-study content kept in a
//! schemaless document store. All reads and writes flow through a
//! [`RecordService`], which wraps any [`DocumentStore`] backend.
//!
//! # Example
//!
//! ```no_run
//! use folio::{CaseStudy, FilterOp, Model, QuerySpec, RecordService};
//! # use folio_core::DocumentStore;
//!
//! # async fn example<S: DocumentStore>(store: S) -> Result<(), folio::Error> {
//! let service = RecordService::new(store);
//!
//! let query = QuerySpec::new().filter("hidden", FilterOp::Eq, false);
//! let studies = service.query_models::<CaseStudy>(&query).await?;
//!
//! for study in studies {
//!     println!("{}: {}", study.id, study.data.company);
//! }
//! # Ok(())
//! # }
//! ```

pub mod arrays;
pub mod case_study;
pub mod data;
pub mod error;
pub mod hooks;
pub mod model;
pub mod pagination;
pub mod record;
pub mod search;
pub mod seed;
pub mod service;

// Re-export primary types at crate root for convenience
pub use case_study::{CaseStudy, CaseStudyDetails, CaseStudyPatch, Methodologies, Section};
pub use error::Error;
pub use hooks::{
    CollectionHook, CollectionState, DocumentHook, DocumentState, LiveCollection, LiveDocument,
};
pub use model::{Model, Schema};
pub use pagination::{DEFAULT_PAGE_SIZE, Page};
pub use record::{Record, Stored};
pub use seed::{SeedOutcome, Seeder};
pub use service::{BatchOperation, RecordService};

pub use folio_core::{
    CollectionName, Cursor, Direction, DocumentId, DocumentStore, Fields, Filter, FilterOp,
    QuerySpec, Value,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
