//! Live hooks backed by store subscriptions.

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use folio_core::{CollectionName, DocumentId, DocumentPath, DocumentStore, QuerySpec};

use super::state::{CollectionState, DocumentState};
use crate::Result;
use crate::error::Error;
use crate::record::Record;
use crate::service::RecordService;

/// A collection kept current by a store subscription.
///
/// Each pushed snapshot replaces `data`. Dropping the value (or calling
/// [`unsubscribe`](Self::unsubscribe)) stops the driver task and releases
/// the listener.
#[derive(Debug)]
pub struct LiveCollection {
    state: watch::Receiver<CollectionState>,
    task: JoinHandle<()>,
}

impl LiveCollection {
    /// Open a subscription. Must be called within a tokio runtime.
    ///
    /// With a limit, one extra record is requested to fill `has_more`.
    #[instrument(skip(service, query), fields(%collection))]
    pub fn subscribe<S>(
        service: &RecordService<S>,
        collection: CollectionName,
        query: QuerySpec,
    ) -> Result<Self>
    where
        S: DocumentStore,
        S::QueryListener: 'static,
    {
        let limit = query.limit_value();
        let listen_query = match limit {
            Some(limit) => {
                let fetch = limit
                    .checked_add(1)
                    .ok_or_else(|| Error::InvalidQuery(format!("limit {limit} is too large")))?;
                query.limit(fetch)
            }
            None => query,
        };

        let mut listener = service
            .store()
            .listen_query(&collection, listen_query)
            .map_err(|e| Error::subscription(&collection, e))?;

        let (tx, state) = watch::channel(CollectionState::loading());
        let task = tokio::spawn(async move {
            while let Some(snapshot) = listener.next().await {
                match snapshot {
                    Ok(documents) => {
                        let mut data: Vec<Record> =
                            documents.into_iter().map(Record::from_document).collect();
                        let has_more = limit.is_some_and(|limit| data.len() > limit);
                        if let Some(limit) = limit {
                            data.truncate(limit);
                        }
                        debug!(%collection, count = data.len(), "Collection snapshot");
                        tx.send_replace(CollectionState {
                            data,
                            loading: false,
                            error: None,
                            has_more,
                        });
                    }
                    Err(e) => {
                        let err = Error::subscription(&collection, e);
                        warn!(error = %err, "Collection subscription error");
                        tx.send_modify(|s| {
                            s.loading = false;
                            s.error = Some(err.to_string());
                        });
                    }
                }
            }
            debug!(%collection, "Collection subscription ended");
        });

        Ok(Self { state, task })
    }

    /// Current state.
    pub fn state(&self) -> CollectionState {
        self.state.borrow().clone()
    }

    /// A receiver observing every update.
    pub fn watch(&self) -> watch::Receiver<CollectionState> {
        self.state.clone()
    }

    /// Wait for the next update. Returns `None` once the subscription has ended.
    pub async fn changed(&mut self) -> Option<CollectionState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Stop listening.
    pub fn unsubscribe(self) {}
}

impl Drop for LiveCollection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A single record kept current by a store subscription.
#[derive(Debug)]
pub struct LiveDocument {
    state: watch::Receiver<DocumentState>,
    task: JoinHandle<()>,
}

impl LiveDocument {
    /// Open a subscription. Must be called within a tokio runtime.
    ///
    /// A deleted or missing record shows as `data = None` with no error.
    #[instrument(skip(service), fields(%collection, %id))]
    pub fn subscribe<S>(
        service: &RecordService<S>,
        collection: CollectionName,
        id: DocumentId,
    ) -> Result<Self>
    where
        S: DocumentStore,
        S::DocumentListener: 'static,
    {
        let path = DocumentPath::new(collection, id);
        let mut listener = service
            .store()
            .listen_document(&path)
            .map_err(|e| Error::subscription(&path, e))?;

        let (tx, state) = watch::channel(DocumentState::loading());
        let task = tokio::spawn(async move {
            while let Some(snapshot) = listener.next().await {
                match snapshot {
                    Ok(document) => {
                        debug!(%path, exists = document.is_some(), "Document snapshot");
                        tx.send_replace(DocumentState {
                            data: document.map(Record::from_document),
                            loading: false,
                            error: None,
                        });
                    }
                    Err(e) => {
                        let err = Error::subscription(&path, e);
                        warn!(error = %err, "Document subscription error");
                        tx.send_modify(|s| {
                            s.loading = false;
                            s.error = Some(err.to_string());
                        });
                    }
                }
            }
            debug!(%path, "Document subscription ended");
        });

        Ok(Self { state, task })
    }

    pub fn state(&self) -> DocumentState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<DocumentState> {
        self.state.clone()
    }

    /// Wait for the next update. Returns `None` once the subscription has ended.
    pub async fn changed(&mut self) -> Option<DocumentState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {}
}

impl Drop for LiveDocument {
    fn drop(&mut self) {
        self.task.abort();
    }
}
