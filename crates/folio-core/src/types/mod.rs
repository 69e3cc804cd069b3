//! Validated identifier types.
//!
//! These types enforce the store's naming rules at construction time,
//! so an invalid collection name or document id never reaches a backend.

mod collection;
mod document_id;
mod document_path;
mod store_url;

pub use collection::CollectionName;
pub use document_id::DocumentId;
pub use document_path::DocumentPath;
pub use store_url::StoreUrl;

/// Maximum size of a collection name or document id, in bytes.
const MAX_SEGMENT_BYTES: usize = 1500;

/// Check a single path segment against the store's naming rules.
///
/// Returns the reason the segment is invalid, if any.
fn segment_error(s: &str) -> Option<String> {
    if s.is_empty() {
        return Some("cannot be empty".to_string());
    }

    if s.len() > MAX_SEGMENT_BYTES {
        return Some(format!(
            "exceeds maximum length of {} bytes",
            MAX_SEGMENT_BYTES
        ));
    }

    if s == "." || s == ".." {
        return Some("cannot be '.' or '..'".to_string());
    }

    if s.contains('/') {
        return Some("cannot contain '/'".to_string());
    }

    if s.len() > 4 && s.starts_with("__") && s.ends_with("__") {
        return Some("names matching __.*__ are reserved".to_string());
    }

    if s.chars().any(|c| c.is_control()) {
        return Some("cannot contain control characters".to_string());
    }

    None
}
