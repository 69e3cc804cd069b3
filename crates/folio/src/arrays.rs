//! Array-field edits.
//!
//! Each edit reads the record, changes the array locally and writes the whole
//! field back. The write only succeeds if the record is still at the version
//! that was read; a concurrent writer turns into a conflict error instead of
//! a lost update. Nothing is retried.

use tracing::{debug, instrument};

use folio_core::{
    CollectionName, DocumentId, DocumentPath, DocumentStore, Fields, Precondition, Value, Write,
};

use crate::Result;
use crate::error::Error;
use crate::service::{RecordService, prepare_update};

impl<S: DocumentStore> RecordService<S> {
    /// Append `item` to the array in `field`. A missing field starts empty.
    #[instrument(skip(self, item), fields(%collection, %id))]
    pub async fn add_to_array(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        field: &str,
        item: Value,
    ) -> Result<()> {
        self.modify_array(collection, id, field, |items| {
            items.push(item);
            true
        })
        .await
    }

    /// Remove the element at `index`. An out-of-range index changes nothing.
    #[instrument(skip(self), fields(%collection, %id))]
    pub async fn remove_from_array(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        field: &str,
        index: usize,
    ) -> Result<()> {
        self.modify_array(collection, id, field, |items| {
            if index < items.len() {
                items.remove(index);
                true
            } else {
                false
            }
        })
        .await
    }

    /// Replace the element at `index`. An out-of-range index changes nothing.
    #[instrument(skip(self, item), fields(%collection, %id))]
    pub async fn update_array_item(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        field: &str,
        index: usize,
        item: Value,
    ) -> Result<()> {
        self.modify_array(collection, id, field, |items| match items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        })
        .await
    }

    async fn modify_array<F>(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        field: &str,
        edit: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Vec<Value>) -> bool,
    {
        let path = DocumentPath::new(collection.clone(), id.clone());

        let Some(doc) = self.fetch(&path).await? else {
            debug!("Record missing, array unchanged");
            return Ok(());
        };

        let mut items = match doc.fields.get(field) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(Error::invalid_record(
                    collection,
                    format!("field '{}' of {} is not an array", field, id),
                ));
            }
        };

        if !edit(&mut items) {
            debug!("Array unchanged");
            return Ok(());
        }

        let mut partial = Fields::new();
        partial.insert(field.to_string(), Value::Array(items));
        let fields = prepare_update(collection, partial)?;

        self.commit_one(
            &path,
            Write::Update {
                path: path.clone(),
                fields,
                precondition: Some(Precondition::UpdateTime(doc.update_time)),
            },
        )
        .await
    }
}
