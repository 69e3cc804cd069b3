//! Store selection for CLI use.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use tracing::debug;

use folio_core::{
    CollectionName, Document, DocumentId, DocumentPath, DocumentStore, Fields, ListenerStream,
    QuerySpec, StoreUrl, Write,
};
use folio_file::FileDatabase;
use folio_rest::FirestoreDatabase;

/// Store wrapper for CLI use.
#[derive(Debug, Clone)]
pub enum CliStore {
    File(FileDatabase),
    Firestore(FirestoreDatabase),
}

/// Open the store named by `--store`.
///
/// `firestore` uses the REST API configured from the environment; a
/// `file://` URL or a plain path opens a file store; nothing opens the
/// default file store in the user's data directory.
pub fn open(spec: Option<&str>) -> Result<CliStore> {
    let store = match spec.map(str::trim) {
        Some("firestore") => CliStore::Firestore(
            FirestoreDatabase::from_env().context("Failed to configure Firestore")?,
        ),
        Some(s) if s.starts_with("file://") => {
            let url = StoreUrl::new(s).context("Invalid store URL")?;
            CliStore::File(FileDatabase::from_url(url).context("Failed to open file store")?)
        }
        Some(path) => {
            CliStore::File(FileDatabase::open(path).context("Failed to open file store")?)
        }
        None => CliStore::File(
            FileDatabase::open(default_store_path()?).context("Failed to open file store")?,
        ),
    };

    debug!(url = %store.url(), "Opened store");
    Ok(store)
}

fn default_store_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "folio").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("store"))
}

#[async_trait]
impl DocumentStore for CliStore {
    type QueryListener = ListenerStream<Vec<Document>>;
    type DocumentListener = ListenerStream<Option<Document>>;

    fn url(&self) -> &StoreUrl {
        match self {
            CliStore::File(db) => db.url(),
            CliStore::Firestore(db) => db.url(),
        }
    }

    async fn add_document(
        &self,
        collection: &CollectionName,
        fields: Fields,
    ) -> folio_core::Result<DocumentId> {
        match self {
            CliStore::File(db) => db.add_document(collection, fields).await,
            CliStore::Firestore(db) => db.add_document(collection, fields).await,
        }
    }

    async fn get_document(&self, path: &DocumentPath) -> folio_core::Result<Option<Document>> {
        match self {
            CliStore::File(db) => db.get_document(path).await,
            CliStore::Firestore(db) => db.get_document(path).await,
        }
    }

    async fn run_query(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> folio_core::Result<Vec<Document>> {
        match self {
            CliStore::File(db) => db.run_query(collection, query).await,
            CliStore::Firestore(db) => db.run_query(collection, query).await,
        }
    }

    async fn commit(&self, writes: Vec<Write>) -> folio_core::Result<()> {
        match self {
            CliStore::File(db) => db.commit(writes).await,
            CliStore::Firestore(db) => db.commit(writes).await,
        }
    }

    fn listen_query(
        &self,
        collection: &CollectionName,
        query: QuerySpec,
    ) -> folio_core::Result<Self::QueryListener> {
        match self {
            CliStore::File(db) => db.listen_query(collection, query),
            CliStore::Firestore(db) => db.listen_query(collection, query),
        }
    }

    fn listen_document(&self, path: &DocumentPath) -> folio_core::Result<Self::DocumentListener> {
        match self {
            CliStore::File(db) => db.listen_document(path),
            CliStore::Firestore(db) => db.listen_document(path),
        }
    }
}
