//! Query Sort Orders
//!
//! Sort orders define how query results should be ordered. A query holds an
//! ordered list of `QueryOrderBy`; earlier entries take priority.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Get the opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

/// A single ordering entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryOrderBy {
    /// The field to sort by
    pub field: String,
    /// Sort from largest to smallest
    pub descending: bool,
}

impl QueryOrderBy {
    /// Create a new ordering entry
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            descending: direction.is_descending(),
        }
    }

    /// Create ascending sort
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Create descending sort
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    pub fn direction(&self) -> SortDirection {
        if self.descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    /// Reverse the sort direction
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            descending: !self.descending,
        }
    }
}

/// Check if an ordering sorts by a specific field
pub fn sorts_by(order: &[QueryOrderBy], field: &str) -> bool {
    order.iter().any(|o| o.field == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_str("asc"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::from_str("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_str("sideways"), None);
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.reverse(), SortDirection::Asc);
    }

    #[test]
    fn test_order_by() {
        let order = QueryOrderBy::asc("created_at");
        assert_eq!(order.field, "created_at");
        assert!(!order.descending);
        assert_eq!(order.direction(), SortDirection::Asc);

        let reversed = order.reversed();
        assert!(reversed.descending);
        assert_eq!(reversed.direction(), SortDirection::Desc);
    }

    #[test]
    fn test_sorts_by() {
        let order = vec![QueryOrderBy::desc("updated_at"), QueryOrderBy::asc("id")];
        assert!(sorts_by(&order, "updated_at"));
        assert!(sorts_by(&order, "id"));
        assert!(!sorts_by(&order, "subject"));
    }
}
