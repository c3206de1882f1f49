//! Single-field conditions for `Query::where_field`
//!
//! A `Condition` names exactly one comparison kind together with its
//! operand, so a raw string-field filter can never carry two operators at
//! once.

use qe_core::Value;

use crate::filters::{FilterOperator, QueryFilter};

/// One comparison against a named field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Equals(Value),
    NotEquals(Value),
    LessThan(Value),
    LessThanOrEquals(Value),
    GreaterThan(Value),
    GreaterThanOrEquals(Value),
    /// `true` selects null rows, `false` selects non-null rows
    IsNull(bool),
    WhereIn(Vec<Value>),
    WhereNotIn(Vec<Value>),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    ArrayContains(Value),
    ArrayContainsAny(Vec<Value>),
}

impl Condition {
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    pub fn not_equals(value: impl Into<Value>) -> Self {
        Self::NotEquals(value.into())
    }

    pub fn less_than(value: impl Into<Value>) -> Self {
        Self::LessThan(value.into())
    }

    pub fn less_than_or_equals(value: impl Into<Value>) -> Self {
        Self::LessThanOrEquals(value.into())
    }

    pub fn greater_than(value: impl Into<Value>) -> Self {
        Self::GreaterThan(value.into())
    }

    pub fn greater_than_or_equals(value: impl Into<Value>) -> Self {
        Self::GreaterThanOrEquals(value.into())
    }

    pub fn is_null(is_null: bool) -> Self {
        Self::IsNull(is_null)
    }

    pub fn where_in<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::WhereIn(values.into_iter().map(Into::into).collect())
    }

    pub fn where_not_in<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::WhereNotIn(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    pub fn starts_with(text: impl Into<String>) -> Self {
        Self::StartsWith(text.into())
    }

    pub fn ends_with(text: impl Into<String>) -> Self {
        Self::EndsWith(text.into())
    }

    pub fn array_contains(element: impl Into<Value>) -> Self {
        Self::ArrayContains(element.into())
    }

    pub fn array_contains_any<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::ArrayContainsAny(elements.into_iter().map(Into::into).collect())
    }

    /// Operator this condition lowers to
    pub fn operator(&self) -> FilterOperator {
        match self {
            Self::Equals(_) => FilterOperator::Equals,
            Self::NotEquals(_) => FilterOperator::NotEquals,
            Self::LessThan(_) => FilterOperator::LessThan,
            Self::LessThanOrEquals(_) => FilterOperator::LessThanOrEquals,
            Self::GreaterThan(_) => FilterOperator::GreaterThan,
            Self::GreaterThanOrEquals(_) => FilterOperator::GreaterThanOrEquals,
            Self::IsNull(true) => FilterOperator::IsNull,
            Self::IsNull(false) => FilterOperator::IsNotNull,
            Self::WhereIn(_) => FilterOperator::WhereIn,
            Self::WhereNotIn(_) => FilterOperator::WhereNotIn,
            Self::Contains(_) => FilterOperator::Contains,
            Self::StartsWith(_) => FilterOperator::StartsWith,
            Self::EndsWith(_) => FilterOperator::EndsWith,
            Self::ArrayContains(_) => FilterOperator::ArrayContains,
            Self::ArrayContainsAny(_) => FilterOperator::ArrayContainsAny,
        }
    }

    /// Build the filter for `field`
    pub fn into_filter(self, field: impl Into<String>) -> QueryFilter {
        let operator = self.operator();
        let value = match self {
            Self::Equals(v)
            | Self::NotEquals(v)
            | Self::LessThan(v)
            | Self::LessThanOrEquals(v)
            | Self::GreaterThan(v)
            | Self::GreaterThanOrEquals(v)
            | Self::ArrayContains(v) => v,
            Self::IsNull(_) => Value::Null,
            Self::WhereIn(values) | Self::WhereNotIn(values) | Self::ArrayContainsAny(values) => {
                Value::List(values)
            }
            Self::Contains(text) | Self::StartsWith(text) | Self::EndsWith(text) => {
                Value::String(text)
            }
        };
        QueryFilter::new(field, operator, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_flag() {
        assert_eq!(
            Condition::is_null(true).into_filter("assignee"),
            QueryFilter::is_null("assignee")
        );
        assert_eq!(
            Condition::is_null(false).into_filter("assignee"),
            QueryFilter::is_not_null("assignee")
        );
    }

    #[test]
    fn test_list_conditions() {
        let filter = Condition::where_in([1, 2, 3]).into_filter("id");
        assert_eq!(filter.operator, FilterOperator::WhereIn);
        assert_eq!(filter.value, Value::list([1, 2, 3]));

        let filter = Condition::array_contains_any(["a"]).into_filter("tags");
        assert_eq!(filter.operator, FilterOperator::ArrayContainsAny);
        assert_eq!(filter.value, Value::list(["a"]));
    }

    #[test]
    fn test_every_condition_yields_valid_filter() {
        let conditions = vec![
            Condition::equals(1),
            Condition::not_equals(1),
            Condition::less_than(1),
            Condition::less_than_or_equals(1),
            Condition::greater_than(1),
            Condition::greater_than_or_equals(1),
            Condition::is_null(true),
            Condition::is_null(false),
            Condition::where_in([1]),
            Condition::where_not_in([1]),
            Condition::contains("a"),
            Condition::starts_with("a"),
            Condition::ends_with("a"),
            Condition::array_contains("a"),
            Condition::array_contains_any(["a"]),
        ];
        for condition in conditions {
            let op = condition.operator();
            let filter = condition.into_filter("f");
            assert_eq!(filter.operator, op);
            assert!(filter.is_valid(), "{:?} produced an invalid filter", op);
        }
    }
}
