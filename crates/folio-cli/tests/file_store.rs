//! CLI integration tests against a file store.

mod common;

use tempfile::TempDir;

use common::{
    created_id, file_store_url, json_lines, run_cli, run_cli_success, run_cli_with_stdin,
};

fn create_test_store() -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let url = file_store_url(&tmp.path().join("store"));
    (tmp, url)
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_create_get_delete() {
    let (_tmp, store) = create_test_store();

    let stdout = run_cli_with_stdin(
        &["create", "notes", "--json", "-"],
        &store,
        r#"{ "title": "Hello", "tags": [] }"#,
    );
    assert!(stdout.contains("✓"));
    let id = created_id(&stdout);

    let stdout = run_cli_success(&["get", "notes", &id], &store);
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["id"], id.as_str());
    assert_eq!(record["title"], "Hello");
    assert!(record["createdAt"].is_string());

    run_cli_success(&["delete", "notes", &id], &store);
    let output = run_cli(&["get", "notes", &id], &store);
    assert!(!output.status.success());
}

#[test]
fn test_create_from_file_with_id_and_update() {
    let (tmp, store) = create_test_store();
    let file = tmp.path().join("acme.json");
    std::fs::write(&file, r#"{ "company": "Acme", "hidden": false }"#).unwrap();
    let patch = tmp.path().join("patch.json");
    std::fs::write(&patch, r#"{ "featured": true }"#).unwrap();

    run_cli_success(
        &[
            "create",
            "caseStudies",
            "--id",
            "acme",
            "--json",
            file.to_str().unwrap(),
        ],
        &store,
    );
    run_cli_success(
        &["update", "caseStudies", "acme", "--json", patch.to_str().unwrap()],
        &store,
    );

    let stdout = run_cli_success(&["get", "caseStudies", "acme"], &store);
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["company"], "Acme");
    assert_eq!(record["featured"], true);
}

#[test]
fn test_invalid_case_study_is_rejected() {
    let (tmp, store) = create_test_store();
    let file = tmp.path().join("bad.json");
    std::fs::write(&file, r#"{ "company": "" }"#).unwrap();

    let output = run_cli(
        &["create", "caseStudies", "--json", file.to_str().unwrap()],
        &store,
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("company"));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_seed_list_and_search() {
    let (_tmp, store) = create_test_store();

    run_cli_success(&["seed"], &store);
    run_cli_success(&["seed"], &store);

    let records = json_lines(&run_cli_success(&["list", "caseStudies"], &store));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "bravado-health");

    let found = json_lines(&run_cli_success(
        &["search", "caseStudies", "company", "Bra"],
        &store,
    ));
    assert_eq!(found.len(), 1);

    let none = json_lines(&run_cli_success(
        &["list", "caseStudies", "--where", "hidden:==:true"],
        &store,
    ));
    assert!(none.is_empty());
}

#[test]
fn test_page_with_cursor() {
    let (_tmp, store) = create_test_store();
    for n in 0..3 {
        run_cli_with_stdin(
            &["create", "notes", "--json", "-"],
            &store,
            &format!(r#"{{ "n": {} }}"#, n),
        );
    }

    let output = run_cli(
        &["page", "notes", "--page-size", "2", "--order-by", "n"],
        &store,
    );
    assert!(output.status.success());
    let first = json_lines(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(first.len(), 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    let cursor = stderr
        .lines()
        .find_map(|line| line.split_once("Next cursor: ").map(|(_, c)| c.trim().to_string()))
        .expect("No cursor printed");

    let second = json_lines(&run_cli_success(
        &[
            "page",
            "notes",
            "--page-size",
            "2",
            "--order-by",
            "n",
            "--cursor",
            &cursor,
        ],
        &store,
    ));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["n"], 2);
}

// ============================================================================
// Arrays and live updates
// ============================================================================

#[test]
fn test_array_commands() {
    let (_tmp, store) = create_test_store();
    let id = created_id(&run_cli_with_stdin(
        &["create", "notes", "--json", "-"],
        &store,
        r#"{ "title": "t" }"#,
    ));

    run_cli_success(&["array", "add", "notes", &id, "tags", "X"], &store);
    run_cli_success(&["array", "add", "notes", &id, "tags", "Y"], &store);
    run_cli_success(&["array", "set", "notes", &id, "tags", "0", "Z"], &store);

    let stdout = run_cli_success(&["get", "notes", &id], &store);
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["tags"], serde_json::json!(["Z", "Y"]));

    run_cli_success(&["array", "remove", "notes", &id, "tags", "1"], &store);
    let stdout = run_cli_success(&["get", "notes", &id], &store);
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(record["tags"], serde_json::json!(["Z"]));
}

#[test]
fn test_watch_prints_snapshot() {
    let (_tmp, store) = create_test_store();
    run_cli_success(&["seed"], &store);

    let stdout = run_cli_success(&["watch", "caseStudies", "--count", "1"], &store);
    let snapshots = json_lines(&stdout);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0][0]["company"], "Bravado Health");
}
