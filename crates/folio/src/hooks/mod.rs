//! Data-fetching hooks.
//!
//! Hooks hold `{ data, loading, error }` state for a consumer and publish every
//! change through a [`tokio::sync::watch`] channel. One-shot hooks fetch on
//! demand; live hooks stay subscribed to the store until dropped.

mod collection;
mod document;
mod live;
mod state;

pub use collection::CollectionHook;
pub use document::{DocumentHook, NOT_FOUND_MESSAGE};
pub use live::{LiveCollection, LiveDocument};
pub use state::{CollectionState, DocumentState};
