//! Firestore REST request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Value as Json, json};

use folio_core::value::wire::{self, WireDocument};
use folio_core::{
    CollectionName, DOCUMENT_ID_FIELD, Filter, FilterOp, Precondition, QuerySpec, Result, Value,
    Write, split_server_timestamps,
};

/// Error body returned by the REST API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[allow(dead_code)]
    pub code: Option<i64>,
    pub message: Option<String>,
    pub status: Option<String>,
}

/// Request body for `documents:runQuery`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: Json,
}

/// One element of the `runQuery` response stream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponseItem {
    pub document: Option<WireDocument>,
}

/// Request body for `documents:commit`.
#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub writes: Vec<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[allow(dead_code)]
    pub commit_time: Option<String>,
}

/// Quote a dotted field path for the REST API.
///
/// Segments that are not plain identifiers are wrapped in backticks.
pub fn quote_field_path(path: &str) -> String {
    if path == DOCUMENT_ID_FIELD {
        return path.to_string();
    }
    path.split('.')
        .map(quote_segment)
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_segment(segment: &str) -> String {
    let simple = segment
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        segment.to_string()
    } else {
        let escaped = segment.replace('\\', "\\\\").replace('`', "\\`");
        format!("`{}`", escaped)
    }
}

fn operator_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "EQUAL",
        FilterOp::NotEq => "NOT_EQUAL",
        FilterOp::Lt => "LESS_THAN",
        FilterOp::Le => "LESS_THAN_OR_EQUAL",
        FilterOp::Gt => "GREATER_THAN",
        FilterOp::Ge => "GREATER_THAN_OR_EQUAL",
        FilterOp::ArrayContains => "ARRAY_CONTAINS",
        FilterOp::In => "IN",
        FilterOp::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
        FilterOp::NotIn => "NOT_IN",
    }
}

fn encode_filter(filter: &Filter) -> Result<Json> {
    let field = json!({ "fieldPath": quote_field_path(&filter.field) });

    // Null and NaN equality use unary filters.
    let unary = match (&filter.op, &filter.value) {
        (FilterOp::Eq, Value::Null) => Some("IS_NULL"),
        (FilterOp::NotEq, Value::Null) => Some("IS_NOT_NULL"),
        (FilterOp::Eq, Value::Double(d)) if d.is_nan() => Some("IS_NAN"),
        (FilterOp::NotEq, Value::Double(d)) if d.is_nan() => Some("IS_NOT_NAN"),
        _ => None,
    };

    if let Some(op) = unary {
        return Ok(json!({ "unaryFilter": { "field": field, "op": op } }));
    }

    Ok(json!({
        "fieldFilter": {
            "field": field,
            "op": operator_name(filter.op),
            "value": wire::encode_value(&filter.value)?,
        }
    }))
}

/// Build a `structuredQuery` object.
///
/// The effective ordering and the document-id tiebreaker are always sent
/// explicitly so a cursor's values line up with the server's sort keys.
pub fn structured_query(
    collection: &CollectionName,
    query: &QuerySpec,
    documents_root: &str,
) -> Result<Json> {
    let mut structured = json!({
        "from": [{ "collectionId": collection.as_str() }],
    });

    let filters = query
        .filter_list()
        .iter()
        .map(encode_filter)
        .collect::<Result<Vec<_>>>()?;

    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.into_iter().next().unwrap_or_default(),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    let ordering = query.effective_ordering();
    if !ordering.is_empty() || query.cursor().is_some() {
        let mut order_by: Vec<Json> = ordering
            .iter()
            .map(|o| {
                json!({
                    "field": { "fieldPath": quote_field_path(&o.field) },
                    "direction": o.direction.as_str(),
                })
            })
            .collect();
        order_by.push(json!({
            "field": { "fieldPath": DOCUMENT_ID_FIELD },
            "direction": query.tiebreak_direction().as_str(),
        }));
        structured["orderBy"] = Json::Array(order_by);
    }

    if let Some(cursor) = query.cursor() {
        let mut values = cursor
            .values()
            .iter()
            .map(wire::encode_value)
            .collect::<Result<Vec<_>>>()?;
        values.push(json!({
            "referenceValue": format!("{}/{}", documents_root, cursor.path())
        }));
        structured["startAt"] = json!({ "values": values, "before": false });
    }

    if let Some(limit) = query.limit_value() {
        structured["limit"] = json!(limit);
    }

    Ok(structured)
}

/// Encode one write for `documents:commit`.
pub fn encode_write(write: &Write, documents_root: &str) -> Result<Json> {
    let name = format!("{}/{}", documents_root, write.path());

    let (fields, precondition, merge) = match write {
        Write::Delete { .. } => return Ok(json!({ "delete": name })),
        Write::Set {
            fields,
            precondition,
            ..
        } => (fields, *precondition, false),
        Write::Update {
            fields,
            precondition,
            ..
        } => (
            fields,
            Some(precondition.unwrap_or(Precondition::Exists(true))),
            true,
        ),
    };

    let (plain, transforms) = split_server_timestamps(fields)?;

    let mut encoded = json!({
        "update": {
            "name": name,
            "fields": wire::encode_fields(&plain)?,
        }
    });

    if merge {
        // Top-level names are single segments even when they contain dots.
        let mask: Vec<String> = plain.keys().map(|k| quote_segment(k)).collect();
        encoded["updateMask"] = json!({ "fieldPaths": mask });
    }

    if !transforms.is_empty() {
        let transforms: Vec<Json> = transforms
            .iter()
            .map(|field| {
                json!({
                    "fieldPath": quote_segment(field),
                    "setToServerValue": "REQUEST_TIME",
                })
            })
            .collect();
        encoded["updateTransforms"] = Json::Array(transforms);
    }

    match precondition {
        Some(Precondition::Exists(exists)) => {
            encoded["currentDocument"] = json!({ "exists": exists });
        }
        Some(Precondition::UpdateTime(time)) => {
            encoded["currentDocument"] = json!({ "updateTime": wire::format_timestamp(&time) });
        }
        None => {}
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Direction, DocumentPath, Fields};

    const ROOT: &str = "projects/p/databases/(default)/documents";

    #[test]
    fn quotes_field_paths() {
        assert_eq!(quote_field_path("company"), "company");
        assert_eq!(quote_field_path("details.timeline"), "details.timeline");
        assert_eq!(quote_field_path("team-members"), "`team-members`");
        assert_eq!(quote_field_path("__name__"), "__name__");
        assert_eq!(quote_field_path("9lives"), "`9lives`");
    }

    #[test]
    fn encodes_prefix_query() {
        let collection = CollectionName::new("caseStudies").unwrap();
        let query = QuerySpec::new()
            .filter("company", FilterOp::Ge, "Bra")
            .filter("company", FilterOp::Le, "Bra\u{f8ff}")
            .limit(10);

        let encoded = structured_query(&collection, &query, ROOT).unwrap();
        assert_eq!(encoded["from"][0]["collectionId"], "caseStudies");
        assert_eq!(encoded["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            encoded["where"]["compositeFilter"]["filters"][0]["fieldFilter"]["op"],
            "GREATER_THAN_OR_EQUAL"
        );
        assert_eq!(encoded["orderBy"][0]["field"]["fieldPath"], "company");
        assert_eq!(encoded["orderBy"][1]["field"]["fieldPath"], "__name__");
        assert_eq!(encoded["limit"], 10);
    }

    #[test]
    fn encodes_null_equality_as_unary() {
        let collection = CollectionName::new("caseStudies").unwrap();
        let query = QuerySpec::new().filter("image", FilterOp::Eq, Value::Null);
        let encoded = structured_query(&collection, &query, ROOT).unwrap();
        assert_eq!(encoded["where"]["unaryFilter"]["op"], "IS_NULL");
        assert!(encoded.get("orderBy").is_none());
    }

    #[test]
    fn encodes_cursor_with_reference() {
        let collection = CollectionName::new("caseStudies").unwrap();
        let base = QuerySpec::new().order_by("company", Direction::Descending);
        let doc = folio_core::Document {
            path: DocumentPath::parse("caseStudies/x").unwrap(),
            fields: folio_core::to_fields(&serde_json::json!({ "company": "Acme" })).unwrap(),
            create_time: chrono::Utc::now(),
            update_time: chrono::Utc::now(),
        };
        let cursor = folio_core::Cursor::after(&doc, &base).unwrap();

        let encoded = structured_query(&collection, &base.start_after(cursor), ROOT).unwrap();
        assert_eq!(encoded["startAt"]["before"], false);
        assert_eq!(encoded["startAt"]["values"][0]["stringValue"], "Acme");
        assert_eq!(
            encoded["startAt"]["values"][1]["referenceValue"],
            format!("{}/caseStudies/x", ROOT)
        );
        assert_eq!(encoded["orderBy"][1]["direction"], "DESCENDING");
    }

    #[test]
    fn encodes_update_with_mask_and_transform() {
        let mut fields = Fields::new();
        fields.insert("featured".to_string(), Value::Boolean(true));
        fields.insert("updatedAt".to_string(), Value::ServerTimestamp);

        let write = Write::Update {
            path: DocumentPath::parse("caseStudies/x").unwrap(),
            fields,
            precondition: None,
        };
        let encoded = encode_write(&write, ROOT).unwrap();

        assert_eq!(encoded["update"]["name"], format!("{}/caseStudies/x", ROOT));
        assert_eq!(encoded["updateMask"]["fieldPaths"], json!(["featured"]));
        assert_eq!(encoded["updateTransforms"][0]["fieldPath"], "updatedAt");
        assert_eq!(
            encoded["updateTransforms"][0]["setToServerValue"],
            "REQUEST_TIME"
        );
        assert_eq!(encoded["currentDocument"]["exists"], true);
        assert!(encoded["update"]["fields"].get("updatedAt").is_none());
    }

    #[test]
    fn encodes_set_and_delete() {
        let path = DocumentPath::parse("caseStudies/x").unwrap();
        let set = Write::Set {
            path: path.clone(),
            fields: Fields::new(),
            precondition: None,
        };
        let encoded = encode_write(&set, ROOT).unwrap();
        assert!(encoded.get("updateMask").is_none());
        assert!(encoded.get("currentDocument").is_none());

        let delete = encode_write(&Write::Delete { path }, ROOT).unwrap();
        assert_eq!(delete, json!({ "delete": format!("{}/caseStudies/x", ROOT) }));
    }
}
