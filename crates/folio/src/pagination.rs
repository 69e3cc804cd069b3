//! Cursor-based pagination.

use tracing::{debug, instrument};

use folio_core::{CollectionName, Cursor, DocumentStore, QuerySpec};

use crate::Result;
use crate::error::Error;
use crate::record::Record;
use crate::service::RecordService;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub data: Vec<Record>,
    /// Position of the last record in `data`; pass it back for the next page.
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl<S: DocumentStore> RecordService<S> {
    /// Fetch up to `page_size` records after `cursor`.
    ///
    /// One extra record is requested to learn whether another page exists;
    /// it is never returned. The cursor is only valid with the same filters
    /// and ordering in `options`; any limit in `options` is replaced.
    #[instrument(skip(self, cursor, options), fields(%collection))]
    pub async fn paginate(
        &self,
        collection: &CollectionName,
        page_size: usize,
        cursor: Option<Cursor>,
        options: QuerySpec,
    ) -> Result<Page> {
        if page_size == 0 {
            return Err(Error::InvalidQuery(
                "page size must be at least 1".to_string(),
            ));
        }

        let fetch = page_size
            .checked_add(1)
            .ok_or_else(|| Error::InvalidQuery(format!("page size {page_size} is too large")))?;

        let mut query = options.clone().limit(fetch);
        if let Some(cursor) = cursor {
            query = query.start_after(cursor);
        }

        let mut documents = self.query_documents(collection, &query).await?;
        let has_more = documents.len() > page_size;
        documents.truncate(page_size);

        let next_cursor = documents
            .last()
            .map(|doc| Cursor::after(doc, &options))
            .transpose()
            .map_err(|e| Error::InvalidQuery(e.to_string()))?;

        debug!(count = documents.len(), has_more, "Fetched page");
        Ok(Page {
            data: documents.into_iter().map(Record::from_document).collect(),
            next_cursor,
            has_more,
        })
    }
}
