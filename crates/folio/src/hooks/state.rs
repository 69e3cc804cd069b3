//! Hook state snapshots.

use folio_core::Value;

use crate::record::Record;

/// State of a collection hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub data: Vec<Record>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
}

impl CollectionState {
    pub(crate) fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}

/// State of a single-record hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    pub data: Option<Record>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DocumentState {
    pub(crate) fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    /// Elements of an array field of the current record.
    ///
    /// Empty when there is no record, the field is missing, or it is not an
    /// array.
    pub fn array_field(&self, name: &str) -> Vec<Value> {
        self.data
            .as_ref()
            .and_then(|record| record.fields.get(name))
            .and_then(Value::as_array)
            .map(<[Value]>::to_vec)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_core::{DocumentId, Fields};

    #[test]
    fn test_array_field() {
        let mut fields = Fields::new();
        fields.insert(
            "tags".to_string(),
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        );
        fields.insert("company".to_string(), Value::from("Acme"));

        let state = DocumentState {
            data: Some(Record {
                id: DocumentId::new("x").unwrap(),
                created_at: None,
                updated_at: None,
                version: Utc::now(),
                fields,
            }),
            loading: false,
            error: None,
        };

        assert_eq!(state.array_field("tags").len(), 2);
        assert!(state.array_field("company").is_empty());
        assert!(state.array_field("missing").is_empty());
        assert!(DocumentState::default().array_field("tags").is_empty());
    }
}
