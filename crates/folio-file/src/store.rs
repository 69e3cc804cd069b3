//! Filesystem storage for the file-backed document store.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use folio_core::Result;
use folio_core::error::{Error, InvalidInputError};
use folio_core::value::wire::{self, WireDocument};
use folio_core::{
    CollectionName, Document, DocumentId, DocumentPath, Fields, Precondition, Value, Write,
    split_server_timestamps,
};

pub(crate) const CHANGE_LOG: &str = "changes.jsonl";

/// An entry in the change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// The `collection/id` path of the affected document.
    pub path: String,
    /// Commit time, RFC 3339.
    pub time: String,
    pub op: ChangeOp,
}

/// The kind of change recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Create,
    Update,
    Delete,
}

/// Holds the exclusive store lock until dropped.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Filesystem-backed document storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn documents_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    fn collection_dir(&self, collection: &CollectionName) -> PathBuf {
        self.documents_dir().join(collection.as_str())
    }

    fn document_file(&self, path: &DocumentPath) -> PathBuf {
        self.collection_dir(path.collection())
            .join(format!("{}.json", escape_id(path.id())))
    }

    /// Get the change log path.
    pub fn change_log_path(&self) -> PathBuf {
        self.root.join(CHANGE_LOG)
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    /// Make sure the root directory exists.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock> {
        self.ensure_root()?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(StoreLock { file })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Read one document, or `None` if it does not exist.
    pub fn read_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
        let file = self.document_file(path);
        if !file.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&file)?;
        let wire: WireDocument = serde_json::from_str(&content)
            .map_err(|e| Error::storage(format!("corrupt document {}: {}", path, e)))?;

        Document::from_wire(path.clone(), &wire).map(Some)
    }

    /// Read every document in a collection.
    ///
    /// Files that cannot be decoded are skipped with a warning.
    pub fn list_collection(&self, collection: &CollectionName) -> Result<Vec<Document>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let file = entry?.path();
            if !file.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let Some(id) = file
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(unescape_id)
                .and_then(|s| DocumentId::new(s).ok())
            else {
                warn!(file = %file.display(), "Skipping file with invalid document id");
                continue;
            };

            let path = DocumentPath::new(collection.clone(), id);
            match self.read_document(&path) {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => {}
                Err(e) => warn!(%path, error = %e, "Skipping unreadable document"),
            }
        }

        Ok(documents)
    }

    /// Read the change log.
    pub fn read_changes(&self) -> Result<Vec<ChangeEntry>> {
        let log = self.change_log_path();
        if !log.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&log)?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Apply a batch of writes atomically.
    ///
    /// Every write is checked against the current state (and the effect of
    /// earlier writes in the batch) before anything touches disk, so a
    /// failing write leaves the store unchanged. All documents are then
    /// staged as temp files before any is renamed into place. An I/O error
    /// during those final renames can still leave the batch partly applied.
    /// Returns the commit time.
    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    pub fn apply(&self, writes: &[Write]) -> Result<DateTime<Utc>> {
        let _lock = self.lock()?;

        let mut state: BTreeMap<DocumentPath, Option<Document>> = BTreeMap::new();
        for write in writes {
            let path = write.path();
            if !state.contains_key(path) {
                state.insert(path.clone(), self.read_document(path)?);
            }
        }

        let commit_time = next_commit_time(state.values().flatten().map(|d| d.update_time));

        let mut changes = Vec::with_capacity(writes.len());
        for write in writes {
            let path = write.path().clone();
            let current = state.get(&path).cloned().flatten();

            match write {
                Write::Set {
                    fields,
                    precondition,
                    ..
                } => {
                    check_precondition(&path, current.as_ref(), *precondition)?;
                    let fields = resolve_server_timestamps(fields, commit_time)?;
                    let op = if current.is_some() {
                        ChangeOp::Update
                    } else {
                        ChangeOp::Create
                    };
                    let doc = Document {
                        path: path.clone(),
                        fields,
                        create_time: current.map(|d| d.create_time).unwrap_or(commit_time),
                        update_time: commit_time,
                    };
                    state.insert(path.clone(), Some(doc));
                    changes.push((path, op));
                }
                Write::Update {
                    fields,
                    precondition,
                    ..
                } => {
                    let Some(mut doc) = current else {
                        return Err(Error::NotFound {
                            path: path.to_string(),
                        });
                    };
                    check_precondition(&path, Some(&doc), *precondition)?;
                    let fields = resolve_server_timestamps(fields, commit_time)?;
                    doc.fields.extend(fields);
                    doc.update_time = commit_time;
                    state.insert(path.clone(), Some(doc));
                    changes.push((path, ChangeOp::Update));
                }
                Write::Delete { .. } => {
                    if current.is_some() {
                        state.insert(path.clone(), None);
                        changes.push((path, ChangeOp::Delete));
                    }
                }
            }
        }

        let mut staged = Vec::new();
        let mut removed = Vec::new();
        for (path, doc) in &state {
            if !changes.iter().any(|(changed, _)| changed == path) {
                continue;
            }
            match doc {
                Some(doc) => match self.stage_document(doc) {
                    Ok(files) => staged.push(files),
                    Err(e) => {
                        discard_staged(&staged);
                        return Err(e);
                    }
                },
                None => removed.push(path),
            }
        }

        for (temp, file) in &staged {
            fs::rename(temp, file)?;
        }
        for path in removed {
            self.remove_document(path)?;
        }

        self.append_changes(&changes, commit_time)?;

        debug!(changes = changes.len(), %commit_time, "Committed writes");

        Ok(commit_time)
    }

    /// Write `doc` next to its final location. Returns `(temp, file)`.
    fn stage_document(&self, doc: &Document) -> Result<(PathBuf, PathBuf)> {
        let file = self.document_file(&doc.path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&doc.to_wire()?)
            .map_err(|e| InvalidInputError::value(e.to_string()))?;

        let temp = file.with_extension("tmp");
        fs::write(&temp, &content)?;
        Ok((temp, file))
    }

    fn remove_document(&self, path: &DocumentPath) -> Result<()> {
        let file = self.document_file(path);
        if file.exists() {
            fs::remove_file(&file)?;
        }
        Ok(())
    }

    fn append_changes(&self, changes: &[(DocumentPath, ChangeOp)], time: DateTime<Utc>) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.change_log_path())?;

        let time = wire::format_timestamp(&time);
        for (path, op) in changes {
            let entry = ChangeEntry {
                path: path.to_string(),
                time: time.clone(),
                op: *op,
            };
            let line = serde_json::to_string(&entry)
                .map_err(|e| InvalidInputError::value(e.to_string()))?;
            writeln!(log, "{}", line)?;
        }
        log.sync_data()?;
        Ok(())
    }
}

/// Commit times strictly increase per document so the update time can act
/// as a version token.
fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(e) = fs::remove_file(temp) {
            warn!(file = %temp.display(), error = %e, "Failed to remove staged document");
        }
    }
}

fn next_commit_time(previous: impl Iterator<Item = DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous.max() {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}

fn check_precondition(
    path: &DocumentPath,
    current: Option<&Document>,
    precondition: Option<Precondition>,
) -> Result<()> {
    match (precondition, current) {
        (None, _) => Ok(()),
        (Some(Precondition::Exists(true)), None) => Err(Error::NotFound {
            path: path.to_string(),
        }),
        (Some(Precondition::Exists(false)), Some(_)) => Err(Error::Conflict {
            path: path.to_string(),
        }),
        (Some(Precondition::Exists(_)), _) => Ok(()),
        (Some(Precondition::UpdateTime(expected)), Some(doc)) if doc.update_time == expected => {
            Ok(())
        }
        (Some(Precondition::UpdateTime(_)), _) => Err(Error::Conflict {
            path: path.to_string(),
        }),
    }
}

fn resolve_server_timestamps(fields: &Fields, commit_time: DateTime<Utc>) -> Result<Fields> {
    let (mut plain, transforms) = split_server_timestamps(fields)?;
    for name in transforms {
        plain.insert(name, Value::Timestamp(commit_time));
    }
    Ok(plain)
}

/// Escape a document id into a portable file name.
///
/// Bytes outside `[A-Za-z0-9_-]` become `%XX`.
fn escape_id(id: &DocumentId) -> String {
    let mut out = String::with_capacity(id.as_str().len());
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn unescape_id(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
