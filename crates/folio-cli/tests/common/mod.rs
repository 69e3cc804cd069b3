use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use url::Url;

/// `file://` URL for a store directory.
pub fn file_store_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// Run the CLI binary against the given store.
pub fn run_cli(args: &[&str], store: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_folio"));
    cmd.args(args);
    cmd.env("FOLIO_STORE", store);
    cmd.env("NO_COLOR", "1").env("CLICOLOR", "0");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], store: &str) -> String {
    let output = run_cli(args, store);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with `input` on stdin and expect success.
pub fn run_cli_with_stdin(args: &[&str], store: &str, input: &str) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_folio"))
        .args(args)
        .env("FOLIO_STORE", store)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Parse one JSON record per stdout line.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

/// Pull the id out of `ID: <id>` output.
pub fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .filter(|line| line.contains("ID"))
        .find_map(|line| line.split_whitespace().last().map(String::from))
        .expect("No ID in output")
}
