//! Record service.
//!
//! [`RecordService`] is the single entry point for reading and writing
//! records. It owns the bookkeeping fields (`createdAt`, `updatedAt`),
//! enforces collection schemas before anything reaches the store, and wraps
//! store failures with the operation they interrupted.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument};

use folio_core::{
    CollectionName, Document, DocumentId, DocumentPath, DocumentStore, Fields, Precondition,
    QuerySpec, Value, Write, to_fields,
};

use crate::Result;
use crate::error::Error;
use crate::model::{Model, Schema};
use crate::record::{CREATED_AT, RESERVED_FIELDS, Record, Stored, UPDATED_AT};

/// One operation in an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Create a record. Without an id, one is generated.
    Create {
        collection: CollectionName,
        id: Option<DocumentId>,
        data: Fields,
    },
    Update {
        collection: CollectionName,
        id: DocumentId,
        data: Fields,
    },
    Delete {
        collection: CollectionName,
        id: DocumentId,
    },
}

/// Reads and writes records through a document store.
pub struct RecordService<S> {
    store: Arc<S>,
}

impl<S> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> fmt::Debug for RecordService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordService")
            .field("store", &self.store.url().as_str())
            .finish()
    }
}

impl<S: DocumentStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create a record with a generated id.
    #[instrument(skip(self, data), fields(%collection))]
    pub async fn create(&self, collection: &CollectionName, data: Fields) -> Result<DocumentId> {
        let fields = prepare_create(collection, data)?;

        match self.store.add_document(collection, fields).await {
            Ok(id) => {
                debug!(%id, "Created record");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "Failed to create record");
                Err(Error::write(collection, e))
            }
        }
    }

    /// Create a record at a chosen id, replacing any record already there.
    #[instrument(skip(self, data), fields(%collection, %id))]
    pub async fn create_with_id(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        data: Fields,
    ) -> Result<()> {
        let path = DocumentPath::new(collection.clone(), id.clone());
        let fields = prepare_create(collection, data)?;

        self.commit_one(
            &path,
            Write::Set {
                path: path.clone(),
                fields,
                precondition: None,
            },
        )
        .await?;
        debug!("Created record");
        Ok(())
    }

    /// Read one record. A missing record is `Ok(None)`.
    #[instrument(skip(self), fields(%collection, %id))]
    pub async fn read(&self, collection: &CollectionName, id: &DocumentId) -> Result<Option<Record>> {
        let path = DocumentPath::new(collection.clone(), id.clone());
        self.fetch(&path)
            .await
            .map(|doc| doc.map(Record::from_document))
    }

    pub(crate) async fn fetch(&self, path: &DocumentPath) -> Result<Option<Document>> {
        self.store.get_document(path).await.map_err(|e| {
            error!(%path, error = %e, "Failed to read record");
            Error::read(path, e)
        })
    }

    /// Merge `partial` into an existing record.
    #[instrument(skip(self, partial), fields(%collection, %id))]
    pub async fn update(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        partial: Fields,
    ) -> Result<()> {
        self.update_with(collection, id, partial, None).await
    }

    /// Merge `partial` only if the record is still at `version`.
    ///
    /// A concurrent change surfaces as a conflict ([`Error::is_conflict`]).
    #[instrument(skip(self, partial), fields(%collection, %id, %version))]
    pub async fn update_if_unchanged(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        partial: Fields,
        version: DateTime<Utc>,
    ) -> Result<()> {
        self.update_with(collection, id, partial, Some(Precondition::UpdateTime(version)))
            .await
    }

    async fn update_with(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        partial: Fields,
        precondition: Option<Precondition>,
    ) -> Result<()> {
        let path = DocumentPath::new(collection.clone(), id.clone());
        let fields = prepare_update(collection, partial)?;

        self.commit_one(
            &path,
            Write::Update {
                path: path.clone(),
                fields,
                precondition,
            },
        )
        .await?;
        debug!("Updated record");
        Ok(())
    }

    /// Delete a record. Deleting a missing record succeeds.
    #[instrument(skip(self), fields(%collection, %id))]
    pub async fn delete(&self, collection: &CollectionName, id: &DocumentId) -> Result<()> {
        let path = DocumentPath::new(collection.clone(), id.clone());
        self.commit_one(&path, Write::Delete { path: path.clone() })
            .await?;
        debug!("Deleted record");
        Ok(())
    }

    pub(crate) async fn commit_one(&self, path: &DocumentPath, write: Write) -> Result<()> {
        self.store.commit(vec![write]).await.map_err(|e| {
            error!(%path, error = %e, "Failed to write record");
            Error::write(path, e)
        })
    }

    /// Run a query and flatten the results.
    #[instrument(skip(self, query), fields(%collection))]
    pub async fn query(&self, collection: &CollectionName, query: &QuerySpec) -> Result<Vec<Record>> {
        let documents = self.query_documents(collection, query).await?;
        debug!(count = documents.len(), "Queried records");
        Ok(documents.into_iter().map(Record::from_document).collect())
    }

    pub(crate) async fn query_documents(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<Document>> {
        query
            .validate()
            .map_err(|e| Error::InvalidQuery(e.to_string()))?;

        self.store.run_query(collection, query).await.map_err(|e| {
            error!(%collection, error = %e, "Failed to query records");
            Error::read(collection, e)
        })
    }

    /// Apply creates, updates and deletes atomically.
    ///
    /// Returns the path of every operation in order, including generated ids.
    /// If any write is rejected none of them take effect.
    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn batch_write(&self, operations: Vec<BatchOperation>) -> Result<Vec<DocumentPath>> {
        let mut paths = Vec::with_capacity(operations.len());
        let mut writes = Vec::with_capacity(operations.len());

        for operation in operations {
            let write = match operation {
                BatchOperation::Create {
                    collection,
                    id,
                    data,
                } => {
                    let fields = prepare_create(&collection, data)?;
                    let id = id.unwrap_or_else(DocumentId::generate);
                    Write::Set {
                        path: DocumentPath::new(collection, id),
                        fields,
                        precondition: None,
                    }
                }
                BatchOperation::Update {
                    collection,
                    id,
                    data,
                } => {
                    let fields = prepare_update(&collection, data)?;
                    Write::Update {
                        path: DocumentPath::new(collection, id),
                        fields,
                        precondition: None,
                    }
                }
                BatchOperation::Delete { collection, id } => Write::Delete {
                    path: DocumentPath::new(collection, id),
                },
            };
            paths.push(write.path().clone());
            writes.push(write);
        }

        self.store.commit(writes).await.map_err(|e| {
            error!(error = %e, "Batch write failed");
            Error::Batch { source: e }
        })?;

        debug!("Committed batch");
        Ok(paths)
    }

    /// Create a typed record with a generated id.
    pub async fn create_model<M: Model>(&self, model: &M) -> Result<DocumentId> {
        let collection = M::collection()?;
        let fields = model_fields(&collection, model)?;
        self.create(&collection, fields).await
    }

    /// Create or replace a typed record at a chosen id.
    pub async fn create_model_with_id<M: Model>(&self, id: &DocumentId, model: &M) -> Result<()> {
        let collection = M::collection()?;
        let fields = model_fields(&collection, model)?;
        self.create_with_id(&collection, id, fields).await
    }

    /// Read a typed record.
    pub async fn read_model<M: Model>(&self, id: &DocumentId) -> Result<Option<Stored<M>>> {
        let collection = M::collection()?;
        self.read(&collection, id)
            .await?
            .map(|record| decode_record(&collection, &record))
            .transpose()
    }

    /// Query typed records.
    pub async fn query_models<M: Model>(&self, query: &QuerySpec) -> Result<Vec<Stored<M>>> {
        let collection = M::collection()?;
        self.query(&collection, query)
            .await?
            .iter()
            .map(|record| decode_record(&collection, record))
            .collect()
    }
}

fn model_fields<M: Model>(collection: &CollectionName, model: &M) -> Result<Fields> {
    to_fields(model).map_err(|e| Error::invalid_record(collection, e))
}

pub(crate) fn decode_record<M: Model>(
    collection: &CollectionName,
    record: &Record,
) -> Result<Stored<M>> {
    Stored::from_record(record)
        .map_err(|e| Error::invalid_record(collection, format!("record {}: {}", record.id, e)))
}

fn strip_reserved(mut fields: Fields) -> Fields {
    for key in RESERVED_FIELDS {
        fields.remove(key);
    }
    fields
}

/// Validate a full body and stamp both timestamps.
fn prepare_create(collection: &CollectionName, data: Fields) -> Result<Fields> {
    let mut fields = strip_reserved(data);
    Schema::for_collection(collection).check_create(collection, &fields)?;

    fields.insert(CREATED_AT.to_string(), Value::ServerTimestamp);
    fields.insert(UPDATED_AT.to_string(), Value::ServerTimestamp);
    Ok(fields)
}

/// Validate a partial body and refresh `updatedAt`.
pub(crate) fn prepare_update(collection: &CollectionName, data: Fields) -> Result<Fields> {
    let mut fields = strip_reserved(data);
    Schema::for_collection(collection).check_update(collection, &fields)?;

    fields.insert(UPDATED_AT.to_string(), Value::ServerTimestamp);
    Ok(fields)
}
