//! In-memory filter evaluation
//!
//! Adapters without a query planner (caches, in-memory stores) apply a
//! query's filters directly to the rows they hold. Rows only need to expose
//! their field values through [`Record`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use qe_core::Value;

use crate::filters::{FilterOperator, QueryFilter};

/// A row whose fields can be read by name
#[cfg_attr(test, mockall::automock)]
pub trait Record {
    /// Value of `name`, or `None` if the row has no such field
    fn field(&self, name: &str) -> Option<Value>;
}

impl Record for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl QueryFilter {
    /// Check whether a record satisfies this filter.
    ///
    /// A missing field reads as `Null`. Ordering operators never match
    /// `Null` or values of incomparable kinds.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let actual = record.field(&self.field).unwrap_or(Value::Null);
        let matched = evaluate(self.operator, &actual, &self.value);
        tracing::trace!(
            field = %self.field,
            operator = %self.operator,
            matched,
            "Evaluated filter"
        );
        matched
    }
}

/// Check whether a record satisfies every filter
pub fn matches_all<R: Record + ?Sized>(filters: &[QueryFilter], record: &R) -> bool {
    filters.iter().all(|filter| filter.matches(record))
}

fn evaluate(operator: FilterOperator, actual: &Value, expected: &Value) -> bool {
    match operator {
        FilterOperator::Equals => actual.loosely_equals(expected),
        FilterOperator::NotEquals => !actual.loosely_equals(expected),
        FilterOperator::LessThan => ordered(actual, expected, Ordering::is_lt),
        FilterOperator::LessThanOrEquals => ordered(actual, expected, Ordering::is_le),
        FilterOperator::GreaterThan => ordered(actual, expected, Ordering::is_gt),
        FilterOperator::GreaterThanOrEquals => ordered(actual, expected, Ordering::is_ge),
        FilterOperator::IsNull => actual.is_null(),
        FilterOperator::IsNotNull => !actual.is_null(),
        FilterOperator::WhereIn => member_of(actual, expected),
        FilterOperator::WhereNotIn => !member_of(actual, expected),
        FilterOperator::Contains => text(actual, expected, |a, b| a.contains(b)),
        FilterOperator::StartsWith => text(actual, expected, |a, b| a.starts_with(b)),
        FilterOperator::EndsWith => text(actual, expected, |a, b| a.ends_with(b)),
        FilterOperator::ArrayContains => actual
            .as_list()
            .map_or(false, |items| items.iter().any(|item| item.loosely_equals(expected))),
        FilterOperator::ArrayContainsAny => match (actual.as_list(), expected.as_list()) {
            (Some(items), Some(wanted)) => wanted
                .iter()
                .any(|w| items.iter().any(|item| item.loosely_equals(w))),
            _ => false,
        },
    }
}

fn ordered(actual: &Value, expected: &Value, accept: fn(Ordering) -> bool) -> bool {
    if actual.is_null() || expected.is_null() {
        return false;
    }
    actual.compare(expected).map_or(false, accept)
}

fn member_of(actual: &Value, list: &Value) -> bool {
    list.as_list()
        .map_or(false, |items| items.iter().any(|item| item.loosely_equals(actual)))
}

fn text(actual: &Value, expected: &Value, test: fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), expected.as_str()) {
        (Some(a), Some(b)) => test(a, b),
        _ => false,
    }
}
