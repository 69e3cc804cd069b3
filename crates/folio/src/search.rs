//! Prefix search and compound filters.
//!
//! Prefix search is a range query over a string field: it is case-sensitive
//! and only matches at the start of the value. There is no full-text index.

use std::cmp::Ordering;

use tracing::instrument;

use folio_core::{CollectionName, DocumentStore, Filter, FilterOp, QuerySpec};

use crate::Result;
use crate::case_study::CaseStudy;
use crate::record::{Record, Stored};
use crate::service::RecordService;

/// Upper bound appended to a prefix; sorts after every character in common use.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Range filters matching every string that starts with `prefix`.
pub fn prefix_filters(field: &str, prefix: &str) -> [Filter; 2] {
    [
        Filter::new(field, FilterOp::Ge, prefix),
        Filter::new(field, FilterOp::Le, format!("{}{}", prefix, PREFIX_SENTINEL)),
    ]
}

impl<S: DocumentStore> RecordService<S> {
    /// Records whose `field` starts with `term`.
    ///
    /// `options` supplies any extra filters, ordering or limit.
    #[instrument(skip(self, options), fields(%collection))]
    pub async fn search_by_field(
        &self,
        collection: &CollectionName,
        field: &str,
        term: &str,
        options: QuerySpec,
    ) -> Result<Vec<Record>> {
        let query = options.with_filters(prefix_filters(field, term));
        self.query(collection, &query).await
    }

    /// Records matching every filter.
    #[instrument(skip(self, filters, options), fields(%collection, filters = filters.len()))]
    pub async fn advanced_filter(
        &self,
        collection: &CollectionName,
        filters: Vec<Filter>,
        options: QuerySpec,
    ) -> Result<Vec<Record>> {
        let query = options.with_filters(filters);
        self.query(collection, &query).await
    }

    /// Case studies that are not hidden, featured first, then by company.
    pub async fn visible_case_studies(&self) -> Result<Vec<Stored<CaseStudy>>> {
        let query = QuerySpec::new().filter("hidden", FilterOp::Eq, false);
        let mut studies = self.query_models::<CaseStudy>(&query).await?;
        studies.sort_by(|a, b| listing_order(&a.data, &b.data));
        Ok(studies)
    }
}

fn listing_order(a: &CaseStudy, b: &CaseStudy) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| a.company.cmp(&b.company))
}
