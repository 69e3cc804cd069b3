//! Sample-data seeding.
//!
//! Seeding is an upsert: an existing record at the sample's id is updated in
//! place, so re-running never duplicates. Two seeders running at the same
//! time can both see the record as missing and both create it; the second
//! create simply overwrites the first.

use tracing::{info, instrument};

use folio_core::{DocumentId, DocumentStore, to_fields};

use crate::Result;
use crate::case_study::CaseStudy;
use crate::data::{self, BRAVADO_HEALTH_ID};
use crate::error::Error;
use crate::model::Model;
use crate::service::RecordService;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    Updated,
}

/// Writes the bundled sample case studies.
pub struct Seeder<S> {
    service: RecordService<S>,
}

impl<S: DocumentStore> Seeder<S> {
    pub fn new(service: RecordService<S>) -> Self {
        Self { service }
    }

    /// Seed the Bravado Health case study at its fixed id.
    pub async fn seed_bravado_health(&self) -> Result<DocumentId> {
        let id = sample_id(BRAVADO_HEALTH_ID)?;
        self.upsert_case_study(&id, &data::bravado_health()).await?;
        Ok(id)
    }

    /// Seed every sample case study.
    #[instrument(skip(self))]
    pub async fn seed_all(&self) -> Result<Vec<DocumentId>> {
        info!("Seeding case studies");

        let mut ids = Vec::new();
        for (id, study) in data::samples() {
            let id = sample_id(id)?;
            self.upsert_case_study(&id, &study).await?;
            ids.push(id);
        }

        info!(count = ids.len(), "Seeded case studies");
        Ok(ids)
    }

    pub async fn case_study_exists(&self, id: &DocumentId) -> Result<bool> {
        let collection = CaseStudy::collection()?;
        Ok(self.service.read(&collection, id).await?.is_some())
    }

    /// Update the case study at `id`, or create it there if missing.
    #[instrument(skip(self, study), fields(%id))]
    pub async fn upsert_case_study(&self, id: &DocumentId, study: &CaseStudy) -> Result<SeedOutcome> {
        let collection = CaseStudy::collection()?;
        let fields = to_fields(study).map_err(|e| Error::invalid_record(&collection, e))?;

        if self.case_study_exists(id).await? {
            self.service.update(&collection, id, fields).await?;
            info!("Updated case study");
            Ok(SeedOutcome::Updated)
        } else {
            self.service.create_with_id(&collection, id, fields).await?;
            info!("Created case study");
            Ok(SeedOutcome::Created)
        }
    }
}

fn sample_id(id: &str) -> Result<DocumentId> {
    DocumentId::new(id).map_err(|e| Error::invalid_record(CaseStudy::COLLECTION, e))
}
