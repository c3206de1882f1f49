//! # qe-queries
//!
//! Query model for the query engine.
//!
//! This crate implements the backend-agnostic half of the engine: typed
//! field accessors, the expression AST and its lowering to flat filters, the
//! immutable `Query<T>` value, and in-memory evaluation and paging for
//! adapters that hold rows themselves.
//!
//! ## Structure
//!
//! - `filters` - Filter operators and the flat `QueryFilter`
//! - `sorts` - Sort directions and `QueryOrderBy`
//! - `expression` - Expression tree and `to_filters`
//! - `fields` - Typed field accessors producing expressions
//! - `condition` - Single-field conditions for raw field names
//! - `query` - The immutable `Query<T>`
//! - `eval` - Filters as predicates over `Record`s
//! - `page` - In-memory page construction
//!
//! ## Example
//!
//! ```
//! use qe_queries::fields::{ComparableField, OrderedField, StringField, TextField};
//! use qe_queries::{Condition, Query, SortDirection};
//!
//! struct Task;
//!
//! const TITLE: StringField<Task> = StringField::new("title");
//! const PRIORITY: ComparableField<Task, i64> = ComparableField::new("priority");
//!
//! let query = Query::<Task>::new()
//!     .where_expression(&TITLE.contains("crash").and(PRIORITY.greater_than(2)))
//!     .unwrap()
//!     .where_field("assignee", Condition::is_null(true))
//!     .order_by_typed(&PRIORITY, SortDirection::Desc)
//!     .first(20);
//!
//! assert_eq!(query.filters().len(), 3);
//! assert!(query.is_not_empty());
//! ```

pub mod condition;
pub mod eval;
pub mod expression;
pub mod fields;
pub mod filters;
pub mod page;
pub mod query;
pub mod sorts;

// Re-exports for convenience
pub use condition::Condition;
pub use eval::{matches_all, Record};
pub use expression::{ExprNode, Expression};
pub use fields::{
    CollectionField, ComparableField, Field, ListField, OrderedField, StringField, TextField,
    TypedField,
};
pub use filters::{FilterOperator, QueryFilter};
pub use page::{paginate, PageOptions, POSITION_FIELD};
pub use query::{Query, QueryUpdate};
pub use sorts::{QueryOrderBy, SortDirection};
