//! File-backed document store implementation.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use folio_core::error::{Error, InvalidInputError};
use folio_core::{
    CollectionName, Document, DocumentPath, DocumentStore, ListenerStream, QuerySpec, Result,
    StoreUrl, Write,
};

use crate::listener;
use crate::store::FileStore;

/// Listener for query results.
pub type FileQueryListener = ListenerStream<Vec<Document>>;

/// Listener for a single document.
pub type FileDocumentListener = ListenerStream<Option<Document>>;

/// Filesystem-backed document store.
///
/// Clones share the in-process change notifications, so a listener opened on
/// one clone sees commits made through another immediately.
#[derive(Debug, Clone)]
pub struct FileDatabase {
    store: FileStore,
    url: StoreUrl,
    notices: broadcast::Sender<()>,
}

impl FileDatabase {
    /// Create a store at `root`, identified by `url`.
    pub fn new(root: impl AsRef<Path>, url: StoreUrl) -> Self {
        let (notices, _) = broadcast::channel(64);
        Self {
            store: FileStore::new(root),
            url,
            notices,
        }
    }

    /// Open a store rooted at a local directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        let url = StoreUrl::from_directory(&root)?;
        Ok(Self::new(root, url))
    }

    /// Open the store a `file://` URL points at.
    pub fn from_url(url: StoreUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| {
            Error::from(InvalidInputError::StoreUrl {
                value: url.to_string(),
                reason: "not a file:// URL".to_string(),
            })
        })?;
        Ok(Self::new(root, url))
    }

    /// Access the underlying file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }
}

#[async_trait]
impl DocumentStore for FileDatabase {
    type QueryListener = FileQueryListener;
    type DocumentListener = FileDocumentListener;

    fn url(&self) -> &StoreUrl {
        &self.url
    }

    #[instrument(skip(self), fields(%path))]
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        debug!("Getting document");
        self.store.read_document(path)
    }

    #[instrument(skip(self, query), fields(%collection))]
    async fn run_query(&self, collection: &CollectionName, query: &QuerySpec) -> Result<Vec<Document>> {
        query.validate()?;
        let documents = query.apply(self.store.list_collection(collection)?);
        debug!(count = documents.len(), "Ran query");
        Ok(documents)
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        self.store.apply(&writes)?;
        let _ = self.notices.send(());
        Ok(())
    }

    #[instrument(skip(self, query), fields(%collection))]
    fn listen_query(
        &self,
        collection: &CollectionName,
        query: QuerySpec,
    ) -> Result<Self::QueryListener> {
        query.validate()?;
        debug!("Listening to query");

        let store = self.store.clone();
        let collection = collection.clone();
        listener::watch(self.store.root(), &self.notices, move || {
            Ok(query.apply(store.list_collection(&collection)?))
        })
    }

    #[instrument(skip(self), fields(%path))]
    fn listen_document(&self, path: &DocumentPath) -> Result<Self::DocumentListener> {
        debug!("Listening to document");

        let store = self.store.clone();
        let path = path.clone();
        listener::watch(self.store.root(), &self.notices, move || {
            store.read_document(&path)
        })
    }
}
