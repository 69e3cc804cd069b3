//! One-shot single-record hook.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use folio_core::{CollectionName, DocumentId, DocumentStore};

use super::state::DocumentState;
use crate::service::RecordService;

/// Error reported when the requested record does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Document not found";

#[derive(Debug)]
struct Params {
    id: Option<DocumentId>,
    generation: u64,
}

/// Fetches one record on demand.
pub struct DocumentHook<S> {
    service: RecordService<S>,
    collection: CollectionName,
    params: Mutex<Params>,
    state: watch::Sender<DocumentState>,
}

impl<S: DocumentStore> DocumentHook<S> {
    /// Create an idle hook. Nothing is fetched until [`refresh`](Self::refresh).
    pub fn new(
        service: RecordService<S>,
        collection: CollectionName,
        id: Option<DocumentId>,
    ) -> Self {
        let (state, _) = watch::channel(DocumentState::default());
        Self {
            service,
            collection,
            params: Mutex::new(Params { id, generation: 0 }),
            state,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DocumentState> {
        self.state.subscribe()
    }

    fn params(&self) -> MutexGuard<'_, Params> {
        self.params.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the record. Without an id the state is cleared instead.
    pub async fn refresh(&self) {
        let (generation, id) = {
            let mut params = self.params();
            params.generation += 1;
            (params.generation, params.id.clone())
        };

        let Some(id) = id else {
            self.state.send_replace(DocumentState::default());
            return;
        };

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.service.read(&self.collection, &id).await;

        let params = self.params();
        if params.generation != generation {
            debug!(generation, "Discarding superseded fetch");
            return;
        }

        let next = match result {
            Ok(Some(record)) => DocumentState {
                data: Some(record),
                loading: false,
                error: None,
            },
            Ok(None) => DocumentState {
                data: None,
                loading: false,
                error: Some(NOT_FOUND_MESSAGE.to_string()),
            },
            Err(e) => {
                warn!(collection = %self.collection, %id, error = %e, "Record fetch failed");
                DocumentState {
                    data: self.state.borrow().data.clone(),
                    loading: false,
                    error: Some(e.to_string()),
                }
            }
        };
        self.state.send_replace(next);
    }

    /// Point the hook at another record (or none) and refetch.
    pub async fn set_id(&self, id: Option<DocumentId>) {
        self.params().id = id;
        self.refresh().await;
    }
}
