//! One-shot collection hook.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use folio_core::{CollectionName, Cursor, DocumentStore, QuerySpec};

use super::state::CollectionState;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::service::RecordService;

#[derive(Debug)]
struct Params {
    query: QuerySpec,
    /// Bumped on every refresh; results from older generations are dropped.
    generation: u64,
    cursor: Option<Cursor>,
}

/// Fetches a paginated collection on demand.
///
/// The page size is the query's limit, or [`DEFAULT_PAGE_SIZE`].
pub struct CollectionHook<S> {
    service: RecordService<S>,
    collection: CollectionName,
    params: Mutex<Params>,
    state: watch::Sender<CollectionState>,
}

impl<S: DocumentStore> CollectionHook<S> {
    /// Create an idle hook. Nothing is fetched until [`refresh`](Self::refresh).
    pub fn new(service: RecordService<S>, collection: CollectionName, query: QuerySpec) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        Self {
            service,
            collection,
            params: Mutex::new(Params {
                query,
                generation: 0,
                cursor: None,
            }),
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> CollectionState {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState> {
        self.state.subscribe()
    }

    fn params(&self) -> MutexGuard<'_, Params> {
        self.params.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the first page, replacing any loaded data.
    pub async fn refresh(&self) {
        let (generation, query) = {
            let mut params = self.params();
            params.generation += 1;
            params.cursor = None;
            (params.generation, params.query.clone())
        };

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let page_size = query.limit_value().unwrap_or(DEFAULT_PAGE_SIZE);
        let result = self
            .service
            .paginate(&self.collection, page_size, None, query)
            .await;

        let mut params = self.params();
        if params.generation != generation {
            debug!(generation, "Discarding superseded fetch");
            return;
        }

        match result {
            Ok(page) => {
                params.cursor = page.next_cursor;
                self.state.send_replace(CollectionState {
                    data: page.data,
                    loading: false,
                    error: None,
                    has_more: page.has_more,
                });
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "Collection fetch failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Append the next page.
    ///
    /// Does nothing unless more records exist and no fetch is in flight.
    pub async fn load_more(&self) {
        let (generation, query, cursor) = {
            let params = self.params();
            let Some(cursor) = params.cursor.clone() else {
                return;
            };

            let proceed = self.state.send_if_modified(|s| {
                if s.has_more && !s.loading {
                    s.loading = true;
                    s.error = None;
                    true
                } else {
                    false
                }
            });
            if !proceed {
                return;
            }
            (params.generation, params.query.clone(), cursor)
        };

        let page_size = query.limit_value().unwrap_or(DEFAULT_PAGE_SIZE);
        let result = self
            .service
            .paginate(&self.collection, page_size, Some(cursor), query)
            .await;

        let mut params = self.params();
        if params.generation != generation {
            debug!(generation, "Discarding superseded page");
            return;
        }

        match result {
            Ok(page) => {
                params.cursor = page.next_cursor;
                self.state.send_modify(|s| {
                    s.data.extend(page.data);
                    s.loading = false;
                    s.has_more = page.has_more;
                });
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "Loading more failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Replace the query and refetch from the first page.
    pub async fn set_query(&self, query: QuerySpec) {
        self.params().query = query;
        self.refresh().await;
    }
}
