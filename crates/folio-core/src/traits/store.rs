//! Document store trait.

use async_trait::async_trait;

use crate::document::{Document, Precondition, Write};
use crate::query::QuerySpec;
use crate::types::{CollectionName, DocumentId, DocumentPath, StoreUrl};
use crate::value::Fields;
use crate::Result;

use super::Listener;

/// A schemaless document store.
///
/// Implementations hold no per-call state; share them behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Listener type for query subscriptions.
    type QueryListener: Listener<Vec<Document>>;
    /// Listener type for single-document subscriptions.
    type DocumentListener: Listener<Option<Document>>;

    /// Returns the URL identifying this store.
    fn url(&self) -> &StoreUrl;

    /// Create a document with a store-generated id.
    async fn add_document(&self, collection: &CollectionName, fields: Fields) -> Result<DocumentId> {
        let id = DocumentId::generate();
        let path = DocumentPath::new(collection.clone(), id.clone());
        self.commit(vec![Write::Set {
            path,
            fields,
            precondition: Some(Precondition::Exists(false)),
        }])
        .await?;
        Ok(id)
    }

    /// Fetch one document. A missing document is `Ok(None)`.
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>>;

    /// Run a query against one collection.
    async fn run_query(&self, collection: &CollectionName, query: &QuerySpec)
    -> Result<Vec<Document>>;

    /// Apply writes atomically: either all of them take effect or none do.
    async fn commit(&self, writes: Vec<Write>) -> Result<()>;

    /// Subscribe to the results of a query.
    fn listen_query(
        &self,
        collection: &CollectionName,
        query: QuerySpec,
    ) -> Result<Self::QueryListener>;

    /// Subscribe to a single document.
    fn listen_document(&self, path: &DocumentPath) -> Result<Self::DocumentListener>;
}
