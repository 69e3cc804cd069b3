//! folio-rest - Firestore REST-backed document store.
//!
//! Talks to the Firestore v1 REST API (or the local emulator) with `reqwest`.
//! Subscriptions poll the server on an interval.

mod client;
mod config;
mod database;
mod endpoints;
mod listener;

pub use client::RestClient;
pub use config::{FirebaseConfig, FirestoreOptions};
pub use database::{FirestoreDatabase, RestDocumentListener, RestQueryListener};
