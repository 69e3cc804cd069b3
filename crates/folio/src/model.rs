//! Typed models and per-collection schema checks.

use serde::Serialize;
use serde::de::DeserializeOwned;

use folio_core::{CollectionName, Fields, from_fields};

use crate::case_study::{CaseStudy, CaseStudyPatch};
use crate::error::Error;

/// A record type bound to one collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the model's records live in.
    const COLLECTION: &'static str;

    fn collection() -> Result<CollectionName, Error> {
        CollectionName::new(Self::COLLECTION)
            .map_err(|e| Error::invalid_record(Self::COLLECTION, e))
    }

    /// Check invariants serde cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Schema applied to writes, chosen by collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    CaseStudy,
    /// Any field map is accepted.
    Open,
}

impl Schema {
    pub fn for_collection(collection: &CollectionName) -> Self {
        if collection.as_str() == CaseStudy::COLLECTION {
            Schema::CaseStudy
        } else {
            Schema::Open
        }
    }

    /// Check a complete record body.
    pub fn check_create(&self, collection: &CollectionName, fields: &Fields) -> Result<(), Error> {
        match self {
            Schema::CaseStudy => {
                let study: CaseStudy = decode(collection, fields)?;
                study
                    .validate()
                    .map_err(|reason| Error::invalid_record(collection, reason))
            }
            Schema::Open => Ok(()),
        }
    }

    /// Check the fields of a partial update.
    pub fn check_update(&self, collection: &CollectionName, fields: &Fields) -> Result<(), Error> {
        match self {
            Schema::CaseStudy => {
                let patch: CaseStudyPatch = decode(collection, fields)?;
                patch
                    .validate()
                    .map_err(|reason| Error::invalid_record(collection, reason))
            }
            Schema::Open => Ok(()),
        }
    }
}

fn decode<T: DeserializeOwned>(collection: &CollectionName, fields: &Fields) -> Result<T, Error> {
    from_fields(fields).map_err(|e| Error::invalid_record(collection, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case_studies() -> CollectionName {
        CollectionName::new("caseStudies").unwrap()
    }

    #[test]
    fn test_schema_for_collection() {
        assert_eq!(Schema::for_collection(&case_studies()), Schema::CaseStudy);
        assert_eq!(
            Schema::for_collection(&CollectionName::new("notes").unwrap()),
            Schema::Open
        );
    }

    #[test]
    fn test_create_requires_company() {
        let fields = folio_core::to_fields(&json!({ "hidden": false })).unwrap();
        let err = Schema::CaseStudy
            .check_create(&case_studies(), &fields)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { .. }));
    }

    #[test]
    fn test_update_checks_field_types() {
        let ok = folio_core::to_fields(&json!({ "featured": true })).unwrap();
        assert!(Schema::CaseStudy.check_update(&case_studies(), &ok).is_ok());

        let bad = folio_core::to_fields(&json!({ "featured": "yes" })).unwrap();
        assert!(Schema::CaseStudy.check_update(&case_studies(), &bad).is_err());
    }

    #[test]
    fn test_open_schema_accepts_anything() {
        let fields = folio_core::to_fields(&json!({ "anything": [1, "two"] })).unwrap();
        assert!(
            Schema::Open
                .check_create(&CollectionName::new("notes").unwrap(), &fields)
                .is_ok()
        );
    }
}
