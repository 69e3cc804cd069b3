//! Firestore REST-backed document store.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use folio_core::error::Error;
use folio_core::value::wire::WireDocument;
use folio_core::{
    CollectionName, Document, DocumentPath, DocumentStore, ListenerStream, QuerySpec, Result,
    StoreUrl, Write,
};

use crate::client::RestClient;
use crate::config::{FirebaseConfig, FirestoreOptions};
use crate::endpoints::{
    CommitRequest, CommitResponse, RunQueryRequest, RunQueryResponseItem, encode_write,
    structured_query,
};
use crate::listener;

/// Listener for query results.
pub type RestQueryListener = ListenerStream<Vec<Document>>;

/// Listener for a single document.
pub type RestDocumentListener = ListenerStream<Option<Document>>;

/// A document store backed by the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreDatabase {
    client: RestClient,
}

impl FirestoreDatabase {
    /// Create a store with explicit connection options.
    pub fn new(options: FirestoreOptions) -> Result<Self> {
        Ok(Self {
            client: RestClient::new(options)?,
        })
    }

    /// Create a store for the hosted service from a Firebase config.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self> {
        Self::new(FirestoreOptions::production(config)?)
    }

    /// Create a store from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(FirestoreOptions::from_env()?)
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    async fn fetch_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        let url = self.client.document_url(path)?;
        match self.client.get::<WireDocument>(url).await {
            Ok(wire) => Document::from_wire(path.clone(), &wire).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_query(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<Document>> {
        query.validate()?;

        let request = RunQueryRequest {
            structured_query: structured_query(
                collection,
                query,
                &self.client.options().documents_root(),
            )?,
        };

        let url = self.client.method_url("runQuery")?;
        let items: Vec<RunQueryResponseItem> = self.client.post(url, &request).await?;

        let mut documents = Vec::with_capacity(items.len());
        for wire in items.into_iter().filter_map(|item| item.document) {
            let path = self.client.parse_document_name(&wire.name, collection)?;
            documents.push(Document::from_wire(path, &wire)?);
        }
        Ok(documents)
    }
}

/// Attach the affected paths to not-found and conflict responses.
fn classify_commit_error(err: Error, writes: &[Write]) -> Error {
    let paths = || {
        writes
            .iter()
            .map(|w| w.path().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if err.is_not_found() {
        Error::NotFound { path: paths() }
    } else if err.is_conflict() {
        Error::Conflict { path: paths() }
    } else {
        err
    }
}

#[async_trait]
impl DocumentStore for FirestoreDatabase {
    type QueryListener = RestQueryListener;
    type DocumentListener = RestDocumentListener;

    fn url(&self) -> &StoreUrl {
        &self.client.options().base_url
    }

    #[instrument(skip(self), fields(%path))]
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        debug!("Getting document");
        self.fetch_document(path).await
    }

    #[instrument(skip(self, query), fields(%collection))]
    async fn run_query(&self, collection: &CollectionName, query: &QuerySpec) -> Result<Vec<Document>> {
        let documents = self.fetch_query(collection, query).await?;
        debug!(count = documents.len(), "Ran query");
        Ok(documents)
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let root = self.client.options().documents_root();
        let request = CommitRequest {
            writes: writes
                .iter()
                .map(|w| encode_write(w, &root))
                .collect::<Result<Vec<_>>>()?,
        };

        let url = self.client.method_url("commit")?;
        match self.client.post::<_, CommitResponse>(url, &request).await {
            Ok(_) => {
                debug!("Committed writes");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Commit rejected");
                Err(classify_commit_error(e, &writes))
            }
        }
    }

    #[instrument(skip(self, query), fields(%collection))]
    fn listen_query(
        &self,
        collection: &CollectionName,
        query: QuerySpec,
    ) -> Result<Self::QueryListener> {
        query.validate()?;
        debug!("Polling query");

        let db = self.clone();
        let collection = collection.clone();
        let interval = self.client.options().poll_interval;
        Ok(listener::poll(interval, move || {
            let db = db.clone();
            let collection = collection.clone();
            let query = query.clone();
            async move { db.fetch_query(&collection, &query).await }
        }))
    }

    #[instrument(skip(self), fields(%path))]
    fn listen_document(&self, path: &DocumentPath) -> Result<Self::DocumentListener> {
        debug!("Polling document");

        let db = self.clone();
        let path = path.clone();
        let interval = self.client.options().poll_interval;
        Ok(listener::poll(interval, move || {
            let db = db.clone();
            let path = path.clone();
            async move { db.fetch_document(&path).await }
        }))
    }
}
