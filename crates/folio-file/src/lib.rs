//! folio-file - Filesystem-backed document store.
//!
//! A local stand-in for the hosted database: each document is one JSON file
//! in the same typed encoding the REST API uses, commits are serialised by an
//! exclusive file lock, and every change is appended to a change log that
//! listeners in this or other processes watch.

mod database;
mod listener;
mod store;

pub use database::{FileDatabase, FileDocumentListener, FileQueryListener};
pub use store::{ChangeEntry, ChangeOp, FileStore};
