//! Query Filters
//!
//! Filters are the flat, implicitly-ANDed predicate list that translators
//! consume. Each filter represents one condition on a single field.

use std::fmt;

use qe_core::Value;
use serde::{Deserialize, Serialize};

/// Filter operators that can be applied to values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Equals (=)
    Equals,
    /// Not equals (!=)
    NotEquals,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEquals,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEquals,
    /// Is null
    IsNull,
    /// Is not null
    IsNotNull,
    /// Member of a list of values
    WhereIn,
    /// Not a member of a list of values
    WhereNotIn,
    /// Substring match
    Contains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
    /// Array field holds the element
    ArrayContains,
    /// Array field holds at least one of the elements
    ArrayContainsAny,
}

impl FilterOperator {
    /// Every operator, in declaration order
    pub const ALL: [FilterOperator; 15] = [
        Self::Equals,
        Self::NotEquals,
        Self::LessThan,
        Self::LessThanOrEquals,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
        Self::IsNull,
        Self::IsNotNull,
        Self::WhereIn,
        Self::WhereNotIn,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::ArrayContains,
        Self::ArrayContainsAny,
    ];

    /// Parse from the camelCase operator name
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// camelCase operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::LessThan => "lessThan",
            Self::LessThanOrEquals => "lessThanOrEquals",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEquals => "greaterThanOrEquals",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
            Self::WhereIn => "whereIn",
            Self::WhereNotIn => "whereNotIn",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::ArrayContains => "arrayContains",
            Self::ArrayContainsAny => "arrayContainsAny",
        }
    }

    /// Logical negation of this operator, if one exists.
    ///
    /// Text and array-membership operators have no inverse in the operator
    /// set and return `None`.
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Self::Equals => Some(Self::NotEquals),
            Self::NotEquals => Some(Self::Equals),
            Self::IsNull => Some(Self::IsNotNull),
            Self::IsNotNull => Some(Self::IsNull),
            Self::GreaterThan => Some(Self::LessThanOrEquals),
            Self::LessThanOrEquals => Some(Self::GreaterThan),
            Self::LessThan => Some(Self::GreaterThanOrEquals),
            Self::GreaterThanOrEquals => Some(Self::LessThan),
            Self::WhereIn => Some(Self::WhereNotIn),
            Self::WhereNotIn => Some(Self::WhereIn),
            Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::ArrayContains
            | Self::ArrayContainsAny => None,
        }
    }

    /// Check if this operator requires a value
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Check if this operator takes a list of values
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            Self::WhereIn | Self::WhereNotIn | Self::ArrayContainsAny
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFilter {
    /// The field being filtered (e.g., "status", "created_at")
    pub field: String,
    /// The operator to apply
    pub operator: FilterOperator,
    /// The operand; `Null` for null checks, a list for set operators
    pub value: Value,
}

impl QueryFilter {
    /// Create a new filter
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create an equals filter
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    /// Create an is null filter
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, Value::Null)
    }

    /// Create an is not null filter
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, Value::Null)
    }

    /// Same field and value under the inverted operator
    pub fn inverted(&self) -> Option<Self> {
        let operator = self.operator.inverse()?;
        Some(Self {
            field: self.field.clone(),
            operator,
            value: self.value.clone(),
        })
    }

    /// Check if this filter is well formed
    pub fn is_valid(&self) -> bool {
        if self.field.is_empty() {
            return false;
        }

        match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => self.value.is_null(),
            op if op.takes_list() => matches!(self.value, Value::List(_)),
            _ => !self.value.is_null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parsing() {
        assert_eq!(FilterOperator::from_str("equals"), Some(FilterOperator::Equals));
        assert_eq!(
            FilterOperator::from_str("arrayContainsAny"),
            Some(FilterOperator::ArrayContainsAny)
        );
        assert_eq!(FilterOperator::from_str("between"), None);
        for op in FilterOperator::ALL {
            assert_eq!(FilterOperator::from_str(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_inversion_table() {
        use FilterOperator::*;
        let table = [
            (Equals, NotEquals),
            (NotEquals, Equals),
            (IsNull, IsNotNull),
            (IsNotNull, IsNull),
            (GreaterThan, LessThanOrEquals),
            (LessThanOrEquals, GreaterThan),
            (LessThan, GreaterThanOrEquals),
            (GreaterThanOrEquals, LessThan),
            (WhereIn, WhereNotIn),
            (WhereNotIn, WhereIn),
        ];
        for (original, inverted) in table {
            assert_eq!(original.inverse(), Some(inverted));
        }
        for op in [Contains, StartsWith, EndsWith, ArrayContains, ArrayContainsAny] {
            assert_eq!(op.inverse(), None);
        }
    }

    #[test]
    fn test_filter_creation() {
        let filter = QueryFilter::equals("status", "open");
        assert_eq!(filter.field, "status");
        assert_eq!(filter.operator, FilterOperator::Equals);
        assert_eq!(filter.value, Value::from("open"));
        assert!(filter.is_valid());
    }

    #[test]
    fn test_filter_is_null() {
        let filter = QueryFilter::is_null("assignee");
        assert_eq!(filter.operator, FilterOperator::IsNull);
        assert!(filter.value.is_null());
        assert!(filter.is_valid());
    }

    #[test]
    fn test_filter_validity() {
        assert!(!QueryFilter::equals("", 1).is_valid());
        assert!(!QueryFilter::new("tags", FilterOperator::WhereIn, "a").is_valid());
        assert!(QueryFilter::new("tags", FilterOperator::WhereIn, vec!["a"]).is_valid());
        assert!(!QueryFilter::new("name", FilterOperator::Equals, Value::Null).is_valid());
    }

    #[test]
    fn test_inverted_keeps_value() {
        let filter = QueryFilter::new("age", FilterOperator::GreaterThan, 18);
        let inverted = filter.inverted().unwrap();
        assert_eq!(inverted.operator, FilterOperator::LessThanOrEquals);
        assert_eq!(inverted.value, Value::from(18));
        assert!(QueryFilter::new("name", FilterOperator::Contains, "x")
            .inverted()
            .is_none());
    }
}
