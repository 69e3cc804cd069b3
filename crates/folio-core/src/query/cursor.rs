//! Pagination cursors.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::QuerySpec;
use crate::document::Document;
use crate::error::{Error, InvalidInputError};
use crate::types::DocumentPath;
use crate::value::{Value, wire};

/// An opaque position in an ordered result set.
///
/// A cursor holds the ordering values of the record it was taken from, that
/// record's path, and a fingerprint of the query's predicates and sort key.
/// It is only valid with a query that has the same fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    values: Vec<Value>,
    path: DocumentPath,
    fingerprint: u64,
}

#[derive(Serialize, Deserialize)]
struct EncodedCursor {
    v: Vec<serde_json::Value>,
    p: String,
    f: String,
}

impl Cursor {
    /// Build a cursor positioned at `doc` within the results of `spec`.
    ///
    /// # Errors
    ///
    /// Fails if the document lacks one of the query's ordering fields.
    pub fn after(doc: &Document, spec: &QuerySpec) -> Result<Self, Error> {
        let values = spec
            .effective_ordering()
            .iter()
            .map(|order| {
                doc.get(&order.field).cloned().ok_or_else(|| {
                    Error::from(InvalidInputError::Cursor {
                        reason: format!("document {} has no '{}' field", doc.path, order.field),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            values,
            path: doc.path.clone(),
            fingerprint: spec.fingerprint(),
        })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Encode as a URL-safe token.
    pub fn encode(&self) -> Result<String, Error> {
        let encoded = EncodedCursor {
            v: self
                .values
                .iter()
                .map(wire::encode_value)
                .collect::<Result<Vec<_>, _>>()?,
            p: self.path.to_string(),
            f: format!("{:016x}", self.fingerprint),
        };
        let bytes = serde_json::to_vec(&encoded).map_err(|e| bad_cursor(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, Error> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| bad_cursor(format!("not base64: {}", e)))?;
        let encoded: EncodedCursor =
            serde_json::from_slice(&bytes).map_err(|e| bad_cursor(e.to_string()))?;

        let values = encoded
            .v
            .iter()
            .map(wire::decode_value)
            .collect::<Result<Vec<_>, _>>()?;
        let path = DocumentPath::parse(&encoded.p)?;
        let fingerprint = u64::from_str_radix(&encoded.f, 16)
            .map_err(|e| bad_cursor(format!("bad fingerprint: {}", e)))?;

        Ok(Self {
            values,
            path,
            fingerprint,
        })
    }
}

fn bad_cursor(reason: String) -> Error {
    InvalidInputError::Cursor { reason }.into()
}
