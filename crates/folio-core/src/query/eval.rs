//! Local query evaluation, used by stores that do not delegate to a server.

use std::cmp::Ordering;

use super::{Direction, Filter, FilterOp, QuerySpec};
use crate::document::Document;
use crate::value::Value;

impl FilterOp {
    /// Evaluate this operator against a document's field value.
    ///
    /// `field` is `None` when the document lacks the field. No operator
    /// matches a missing field, including `!=` and `not-in`.
    pub fn matches(&self, field: Option<&Value>, operand: &Value) -> bool {
        let Some(value) = field else {
            return false;
        };

        match self {
            FilterOp::Eq => value.query_eq(operand),
            FilterOp::NotEq => !value.query_eq(operand),
            FilterOp::Lt => range(value, operand, |o| o == Ordering::Less),
            FilterOp::Le => range(value, operand, |o| o != Ordering::Greater),
            FilterOp::Gt => range(value, operand, |o| o == Ordering::Greater),
            FilterOp::Ge => range(value, operand, |o| o != Ordering::Less),
            FilterOp::ArrayContains => value
                .as_array()
                .is_some_and(|items| items.iter().any(|item| item.query_eq(operand))),
            FilterOp::In => operand
                .as_array()
                .is_some_and(|candidates| candidates.iter().any(|c| value.query_eq(c))),
            FilterOp::ArrayContainsAny => match (value.as_array(), operand.as_array()) {
                (Some(items), Some(candidates)) => items
                    .iter()
                    .any(|item| candidates.iter().any(|c| item.query_eq(c))),
                _ => false,
            },
            FilterOp::NotIn => operand
                .as_array()
                .is_some_and(|candidates| !candidates.iter().any(|c| value.query_eq(c))),
        }
    }
}

// Range predicates only match values of the operand's type class.
fn range(value: &Value, operand: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    value.same_type_class(operand) && accept(value.compare(operand))
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        self.op.matches(doc.get(&self.field), &self.value)
    }
}

impl QuerySpec {
    /// Returns true if the document satisfies every predicate and has a
    /// value for every ordering field.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filter_list().iter().all(|f| f.matches(doc))
            && self
                .effective_ordering()
                .iter()
                .all(|o| doc.get(&o.field).is_some())
    }

    /// Compare two documents under this query's ordering.
    pub fn compare_documents(&self, a: &Document, b: &Document) -> Ordering {
        for order in self.effective_ordering() {
            let ord = match (a.get(&order.field), b.get(&order.field)) {
                (Some(x), Some(y)) => x.compare(y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = directed(ord, order.direction);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        directed(a.path.cmp(&b.path), self.tiebreak_direction())
    }

    /// Evaluate the query over a set of documents.
    ///
    /// Filters, sorts, skips to the cursor and truncates to the limit.
    /// The caller is expected to have called [`QuerySpec::validate`].
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matched: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        matched.sort_by(|a, b| self.compare_documents(a, b));

        if let Some(cursor) = self.cursor() {
            matched.retain(|doc| self.is_after_cursor(doc, cursor));
        }

        if let Some(limit) = self.limit_value() {
            matched.truncate(limit);
        }

        matched
    }

    fn is_after_cursor(&self, doc: &Document, cursor: &super::Cursor) -> bool {
        for (order, position) in self.effective_ordering().iter().zip(cursor.values()) {
            let ord = match doc.get(&order.field) {
                Some(value) => value.compare(position),
                None => Ordering::Less,
            };
            let ord = directed(ord, order.direction);
            if ord != Ordering::Equal {
                return ord == Ordering::Greater;
            }
        }
        directed(doc.path.cmp(cursor.path()), self.tiebreak_direction()) == Ordering::Greater
    }
}

fn directed(ord: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}
