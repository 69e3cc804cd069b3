//! Record service tests against a file-backed store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use folio::{
    BatchOperation, CaseStudy, CollectionName, Direction, DocumentId, Error, Filter, FilterOp,
    QuerySpec, RecordService, SeedOutcome, Seeder, Value,
};
use folio_core::{Document, DocumentPath, DocumentStore, StoreUrl, Write, to_fields};
use folio_file::FileDatabase;
use serde_json::json;
use tempfile::TempDir;

fn create_test_service() -> (TempDir, RecordService<FileDatabase>) {
    let tmp = TempDir::new().unwrap();
    let db = FileDatabase::open(tmp.path()).unwrap();
    (tmp, RecordService::new(db))
}

fn collection(name: &str) -> CollectionName {
    CollectionName::new(name).unwrap()
}

fn fields(json: serde_json::Value) -> folio::Fields {
    to_fields(&json).unwrap()
}

fn id(s: &str) -> DocumentId {
    DocumentId::new(s).unwrap()
}

// ============================================================================
// Create / read / update / delete
// ============================================================================

#[tokio::test]
async fn test_create_then_read() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let id = service
        .create(&notes, fields(json!({ "title": "Hello", "tags": ["a"] })))
        .await
        .unwrap();

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.fields["title"], Value::from("Hello"));
    assert!(record.created_at.is_some());
    assert_eq!(record.created_at, record.updated_at);

    let json = record.to_json();
    assert_eq!(json["id"], id.as_str());
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn test_update_merges_and_refreshes_updated_at() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let id = service
        .create(&notes, fields(json!({ "title": "Hello", "body": "x" })))
        .await
        .unwrap();
    let before = service.read(&notes, &id).await.unwrap().unwrap();

    service
        .update(&notes, &id, fields(json!({ "title": "Hi" })))
        .await
        .unwrap();
    let after = service.read(&notes, &id).await.unwrap().unwrap();

    assert_eq!(after.fields["title"], Value::from("Hi"));
    assert_eq!(after.fields["body"], Value::from("x"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[tokio::test]
async fn test_update_missing_record_fails() {
    let (_tmp, service) = create_test_service();

    let err = service
        .update(&collection("notes"), &id("nope"), fields(json!({ "a": 1 })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_then_read_is_none() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let id = service
        .create(&notes, fields(json!({ "title": "Bye" })))
        .await
        .unwrap();
    service.delete(&notes, &id).await.unwrap();
    assert!(service.read(&notes, &id).await.unwrap().is_none());

    // Deleting again is fine
    service.delete(&notes, &id).await.unwrap();
}

#[tokio::test]
async fn test_reserved_keys_are_ignored() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let id = service
        .create(
            &notes,
            fields(json!({ "id": "spoofed", "createdAt": "1999-01-01T00:00:00Z", "a": 1 })),
        )
        .await
        .unwrap();

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_ne!(id.as_str(), "spoofed");
    assert!(!record.fields.contains_key("id"));
    assert!(record.created_at.unwrap().timestamp() > 946_684_800);
}

#[tokio::test]
async fn test_update_if_unchanged_detects_stale_version() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let id = service
        .create(&notes, fields(json!({ "n": 1 })))
        .await
        .unwrap();
    let stale = service.read(&notes, &id).await.unwrap().unwrap().version;

    service
        .update_if_unchanged(&notes, &id, fields(json!({ "n": 2 })), stale)
        .await
        .unwrap();

    let err = service
        .update_if_unchanged(&notes, &id, fields(json!({ "n": 3 })), stale)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_eq!(record.fields["n"], Value::Integer(2));
}

// ============================================================================
// Schema validation
// ============================================================================

#[tokio::test]
async fn test_case_study_schema_enforced() {
    let (tmp, service) = create_test_service();
    let studies = collection("caseStudies");

    let err = service
        .create(&studies, fields(json!({ "company": "" })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRecord { .. }));

    // Nothing reached the store
    assert!(!tmp.path().join("documents").join("caseStudies").exists());

    let id = service
        .create(&studies, fields(json!({ "company": "Acme" })))
        .await
        .unwrap();
    let err = service
        .update(&studies, &id, fields(json!({ "hidden": "yes" })))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRecord { .. }));
}

#[tokio::test]
async fn test_typed_models() {
    let (_tmp, service) = create_test_service();

    let study = CaseStudy {
        company: "Acme".to_string(),
        featured: true,
        ..Default::default()
    };
    let id = service.create_model(&study).await.unwrap();

    let stored = service.read_model::<CaseStudy>(&id).await.unwrap().unwrap();
    assert_eq!(stored.data, study);
    assert_eq!(stored.id, id);
}

// ============================================================================
// Batch writes
// ============================================================================

#[tokio::test]
async fn test_batch_write_applies_all() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let existing = service
        .create(&notes, fields(json!({ "n": 1 })))
        .await
        .unwrap();
    let doomed = service
        .create(&notes, fields(json!({ "n": 2 })))
        .await
        .unwrap();

    let paths = service
        .batch_write(vec![
            BatchOperation::Create {
                collection: notes.clone(),
                id: None,
                data: fields(json!({ "n": 3 })),
            },
            BatchOperation::Update {
                collection: notes.clone(),
                id: existing.clone(),
                data: fields(json!({ "n": 10 })),
            },
            BatchOperation::Delete {
                collection: notes.clone(),
                id: doomed.clone(),
            },
        ])
        .await
        .unwrap();

    assert_eq!(paths.len(), 3);
    let created = service.read(&notes, paths[0].id()).await.unwrap().unwrap();
    assert_eq!(created.fields["n"], Value::Integer(3));
    let updated = service.read(&notes, &existing).await.unwrap().unwrap();
    assert_eq!(updated.fields["n"], Value::Integer(10));
    assert!(service.read(&notes, &doomed).await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_write_is_atomic() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    let err = service
        .batch_write(vec![
            BatchOperation::Create {
                collection: notes.clone(),
                id: Some(id("first")),
                data: fields(json!({ "n": 1 })),
            },
            BatchOperation::Update {
                collection: notes.clone(),
                id: id("missing"),
                data: fields(json!({ "n": 2 })),
            },
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Batch { .. }));
    assert!(service.read(&notes, &id("first")).await.unwrap().is_none());
}

// ============================================================================
// Search and pagination
// ============================================================================

#[tokio::test]
async fn test_prefix_search() {
    let (_tmp, service) = create_test_service();
    let studies = collection("caseStudies");

    for company in ["Bravado Health", "Acme Bravo", "Brand New", "bravo lower"] {
        service
            .create(&studies, fields(json!({ "company": company })))
            .await
            .unwrap();
    }

    let found = service
        .search_by_field(&studies, "company", "Bra", QuerySpec::new())
        .await
        .unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|r| r.fields["company"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Brand New", "Bravado Health"]);
}

#[tokio::test]
async fn test_advanced_filter() {
    let (_tmp, service) = create_test_service();
    let studies = collection("caseStudies");

    for (company, hidden, featured) in [
        ("Acme", false, true),
        ("Bravado Health", false, false),
        ("Secret", true, true),
    ] {
        service
            .create(
                &studies,
                fields(json!({ "company": company, "hidden": hidden, "featured": featured })),
            )
            .await
            .unwrap();
    }

    let found = service
        .advanced_filter(
            &studies,
            vec![
                Filter::new("hidden", FilterOp::Eq, false),
                Filter::new("featured", FilterOp::Eq, true),
            ],
            QuerySpec::new(),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].fields["company"], Value::from("Acme"));
}

#[tokio::test]
async fn test_visible_case_studies() {
    let (_tmp, service) = create_test_service();

    for (company, hidden, featured) in [
        ("Zeta", false, false),
        ("Acme", false, false),
        ("Secret", true, true),
        ("Bravado Health", false, true),
    ] {
        service
            .create_model(&CaseStudy {
                company: company.to_string(),
                hidden,
                featured,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let studies = service.visible_case_studies().await.unwrap();
    let names: Vec<_> = studies.iter().map(|s| s.data.company.as_str()).collect();
    assert_eq!(names, ["Bravado Health", "Acme", "Zeta"]);
}

#[tokio::test]
async fn test_paginate_thirty_records() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    for n in 0..30 {
        service
            .create(&notes, fields(json!({ "n": n })))
            .await
            .unwrap();
    }

    let options = QuerySpec::new().order_by("n", Direction::Ascending);
    let first = service
        .paginate(&notes, 25, None, options.clone())
        .await
        .unwrap();
    assert_eq!(first.data.len(), 25);
    assert!(first.has_more);
    assert_eq!(first.data[24].fields["n"], Value::Integer(24));

    let second = service
        .paginate(&notes, 25, first.next_cursor, options)
        .await
        .unwrap();
    assert_eq!(second.data.len(), 5);
    assert!(!second.has_more);
    assert_eq!(second.data[0].fields["n"], Value::Integer(25));
}

#[tokio::test]
async fn test_paginate_rejects_zero_and_foreign_cursor() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    for n in 0..3 {
        service
            .create(&notes, fields(json!({ "n": n })))
            .await
            .unwrap();
    }

    let err = service
        .paginate(&notes, 0, None, QuerySpec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));

    let ordered = QuerySpec::new().order_by("n", Direction::Ascending);
    let page = service.paginate(&notes, 1, None, ordered).await.unwrap();
    let cursor = page.next_cursor.unwrap();

    let other = QuerySpec::new().order_by("n", Direction::Descending);
    let err = service
        .paginate(&notes, 1, Some(cursor), other)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));
}

#[tokio::test]
async fn test_paginate_with_huge_page_size() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    for n in 0..3 {
        service
            .create(&notes, fields(json!({ "n": n })))
            .await
            .unwrap();
    }

    let err = service
        .paginate(&notes, usize::MAX, None, QuerySpec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));

    let page = service
        .paginate(&notes, usize::MAX - 1, None, QuerySpec::new())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 3);
    assert!(!page.has_more);
}

// ============================================================================
// Array fields
// ============================================================================

#[tokio::test]
async fn test_array_append_order() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");
    let id = service
        .create(&notes, fields(json!({ "title": "t" })))
        .await
        .unwrap();

    service
        .add_to_array(&notes, &id, "tags", Value::from("X"))
        .await
        .unwrap();
    service
        .add_to_array(&notes, &id, "tags", Value::from("Y"))
        .await
        .unwrap();

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_eq!(
        record.fields["tags"],
        Value::Array(vec![Value::from("X"), Value::from("Y")])
    );
}

#[tokio::test]
async fn test_array_remove_and_update() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");
    let id = service
        .create(&notes, fields(json!({ "tags": ["a", "b", "c"] })))
        .await
        .unwrap();

    service.remove_from_array(&notes, &id, "tags", 1).await.unwrap();
    service
        .update_array_item(&notes, &id, "tags", 0, Value::from("z"))
        .await
        .unwrap();
    // Out of range: no-op
    service.remove_from_array(&notes, &id, "tags", 9).await.unwrap();

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_eq!(
        record.fields["tags"],
        Value::Array(vec![Value::from("z"), Value::from("c")])
    );
}

#[tokio::test]
async fn test_array_edge_cases() {
    let (_tmp, service) = create_test_service();
    let notes = collection("notes");

    // Missing record: no-op
    service
        .add_to_array(&notes, &id("ghost"), "tags", Value::from("x"))
        .await
        .unwrap();
    assert!(service.read(&notes, &id("ghost")).await.unwrap().is_none());

    let id = service
        .create(&notes, fields(json!({ "tags": "not a list" })))
        .await
        .unwrap();
    let err = service
        .add_to_array(&notes, &id, "tags", Value::from("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRecord { .. }));
}

/// Store wrapper that sneaks in a write right after the first read.
struct InterferingStore {
    inner: FileDatabase,
    interfered: AtomicBool,
}

#[async_trait]
impl DocumentStore for InterferingStore {
    type QueryListener = <FileDatabase as DocumentStore>::QueryListener;
    type DocumentListener = <FileDatabase as DocumentStore>::DocumentListener;

    fn url(&self) -> &StoreUrl {
        self.inner.url()
    }

    async fn get_document(&self, path: &DocumentPath) -> folio_core::Result<Option<Document>> {
        let doc = self.inner.get_document(path).await?;
        if !self.interfered.swap(true, Ordering::SeqCst) {
            self.inner
                .commit(vec![Write::Update {
                    path: path.clone(),
                    fields: fields(json!({ "tags": ["concurrent"] })),
                    precondition: None,
                }])
                .await?;
        }
        Ok(doc)
    }

    async fn run_query(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> folio_core::Result<Vec<Document>> {
        self.inner.run_query(collection, query).await
    }

    async fn commit(&self, writes: Vec<Write>) -> folio_core::Result<()> {
        self.inner.commit(writes).await
    }

    fn listen_query(
        &self,
        collection: &CollectionName,
        query: QuerySpec,
    ) -> folio_core::Result<Self::QueryListener> {
        self.inner.listen_query(collection, query)
    }

    fn listen_document(&self, path: &DocumentPath) -> folio_core::Result<Self::DocumentListener> {
        self.inner.listen_document(path)
    }
}

#[tokio::test]
async fn test_array_conflict_is_detected() {
    let tmp = TempDir::new().unwrap();
    let db = FileDatabase::open(tmp.path()).unwrap();
    let notes = collection("notes");

    let id = db
        .add_document(&notes, fields(json!({ "tags": [] })))
        .await
        .unwrap();

    let service = RecordService::new(InterferingStore {
        inner: db,
        interfered: AtomicBool::new(false),
    });

    let err = service
        .add_to_array(&notes, &id, "tags", Value::from("mine"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(err.is_conflict());

    let record = service.read(&notes, &id).await.unwrap().unwrap();
    assert_eq!(
        record.fields["tags"],
        Value::Array(vec![Value::from("concurrent")])
    );
}

// ============================================================================
// Seeding
// ============================================================================

#[tokio::test]
async fn test_seeding_twice_keeps_one_record() {
    let (_tmp, service) = create_test_service();
    let seeder = Seeder::new(service.clone());

    let first = seeder.seed_bravado_health().await.unwrap();
    assert_eq!(first.as_str(), "bravado-health");
    let ids = seeder.seed_all().await.unwrap();
    assert_eq!(ids, vec![first.clone()]);

    let all = service
        .query(&collection("caseStudies"), &QuerySpec::new())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].fields["company"], Value::from("Bravado Health"));
    assert!(seeder.case_study_exists(&first).await.unwrap());
}

#[tokio::test]
async fn test_upsert_reports_outcome() {
    let (_tmp, service) = create_test_service();
    let seeder = Seeder::new(service.clone());
    let study = CaseStudy {
        company: "Acme".to_string(),
        ..Default::default()
    };

    let id = id("acme");
    assert_eq!(
        seeder.upsert_case_study(&id, &study).await.unwrap(),
        SeedOutcome::Created
    );
    assert_eq!(
        seeder.upsert_case_study(&id, &study).await.unwrap(),
        SeedOutcome::Updated
    );
}
