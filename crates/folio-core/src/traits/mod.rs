//! Core traits for document stores and their change listeners.

mod listener;
mod store;

pub use listener::{Listener, ListenerStream};
pub use store::DocumentStore;
