//! Query specifications.
//!
//! A [`QuerySpec`] is an immutable description of a collection query built
//! with a consuming builder:
//!
//! ```
//! use folio_core::{Direction, FilterOp, QuerySpec};
//!
//! let spec = QuerySpec::new()
//!     .filter("hidden", FilterOp::Eq, false)
//!     .order_by("company", Direction::Ascending)
//!     .limit(10);
//! assert_eq!(spec.filter_list().len(), 1);
//! ```

mod cursor;
mod eval;

pub use cursor::Cursor;

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use xxhash_rust::xxh3::xxh3_64;

use crate::error::{Error, InvalidInputError};
use crate::value::Value;
use crate::value::wire;

/// The pseudo-field that orders by document id.
pub const DOCUMENT_ID_FIELD: &str = "__name__";

/// Comparison operator of a `where` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    ArrayContains,
    In,
    ArrayContainsAny,
    NotIn,
}

impl FilterOp {
    /// The operator as written in queries (`==`, `array-contains`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::NotEq => "!=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::In => "in",
            FilterOp::ArrayContainsAny => "array-contains-any",
            FilterOp::NotIn => "not-in",
        }
    }

    /// Operators that imply an ordering on their field.
    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            FilterOp::NotEq
                | FilterOp::Lt
                | FilterOp::Le
                | FilterOp::Gt
                | FilterOp::Ge
                | FilterOp::NotIn
        )
    }

    /// Operators whose operand must be an array.
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            FilterOp::In | FilterOp::ArrayContainsAny | FilterOp::NotIn
        )
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "==" => FilterOp::Eq,
            "!=" => FilterOp::NotEq,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Le,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Ge,
            "array-contains" => FilterOp::ArrayContains,
            "in" => FilterOp::In,
            "array-contains-any" => FilterOp::ArrayContainsAny,
            "not-in" => FilterOp::NotIn,
            other => {
                return Err(InvalidInputError::Other {
                    message: format!("unknown filter operator '{}'", other),
                }
                .into());
            }
        };
        Ok(op)
    }
}

/// A single `where` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// An immutable query over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    filters: Vec<Filter>,
    order_by: Option<OrderBy>,
    limit: Option<usize>,
    start_after: Option<Cursor>,
}

impl QuerySpec {
    /// An unfiltered, unordered, unlimited query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a conjunctive `where` predicate.
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, op, value));
        self
    }

    /// Add several predicates at once.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Set the sort key, replacing any earlier one.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Start strictly after the record the cursor points at.
    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    pub fn filter_list(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    /// The sort keys actually applied, excluding the document-id tiebreaker.
    ///
    /// An explicit `order_by` wins; otherwise the first inequality field
    /// is ordered ascending.
    pub fn effective_ordering(&self) -> Vec<OrderBy> {
        if let Some(order) = &self.order_by {
            return vec![order.clone()];
        }

        self.filters
            .iter()
            .find(|f| f.op.is_inequality())
            .map(|f| OrderBy {
                field: f.field.clone(),
                direction: Direction::Ascending,
            })
            .into_iter()
            .collect()
    }

    /// Direction of the document-id tiebreaker.
    pub fn tiebreak_direction(&self) -> Direction {
        self.effective_ordering()
            .last()
            .map(|o| o.direction)
            .unwrap_or_default()
    }

    /// Hash of the predicates and sort key.
    ///
    /// Cursors remember the fingerprint of the query that produced them. The
    /// hash is XXH3 over a canonical text form, so tokens stay valid across
    /// builds.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.canonical_form().as_bytes())
    }

    fn canonical_form(&self) -> String {
        let mut text = String::new();
        for filter in &self.filters {
            let operand = wire::encode_value(&filter.value)
                .map(|json| json.to_string())
                .unwrap_or_default();
            let _ = writeln!(text, "where {:?} {} {}", filter.field, filter.op, operand);
        }
        if let Some(order) = &self.order_by {
            let _ = writeln!(text, "order {:?} {}", order.field, order.direction.as_str());
        }
        text
    }

    /// Check operand shapes and cursor compatibility.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for a list operator without an array
    /// operand, or a cursor taken from a different query.
    pub fn validate(&self) -> Result<(), Error> {
        for filter in &self.filters {
            if filter.field.is_empty() {
                return Err(InvalidInputError::Other {
                    message: "filter field cannot be empty".to_string(),
                }
                .into());
            }
            if filter.op.takes_list() && filter.value.as_array().is_none() {
                return Err(InvalidInputError::Other {
                    message: format!("operator '{}' requires an array operand", filter.op),
                }
                .into());
            }
        }

        if let Some(cursor) = &self.start_after {
            if cursor.fingerprint() != self.fingerprint() {
                return Err(InvalidInputError::Cursor {
                    reason: "cursor belongs to a query with different filters or ordering"
                        .to_string(),
                }
                .into());
            }
            if cursor.values().len() != self.effective_ordering().len() {
                return Err(InvalidInputError::Cursor {
                    reason: "cursor does not match the query ordering".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}
