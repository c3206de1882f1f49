//! Query Model
//!
//! A `Query<T>` is an immutable description of which `T` rows an adapter
//! should fetch: filters, ordering, limit/offset, cursor bounds and preload
//! hints. Every mutator borrows the receiver and returns a new query, so a
//! query can be shared and extended freely.
//!
//! `limit`, `first` and `last` must be positive. Passing zero is a caller
//! bug and panics at construction time.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use qe_core::{Cursor, QueryResult};

use crate::condition::Condition;
use crate::expression::Expression;
use crate::fields::TypedField;
use crate::filters::QueryFilter;
use crate::sorts::{QueryOrderBy, SortDirection};

/// Immutable query over entity `T`
pub struct Query<T> {
    filters: Vec<QueryFilter>,
    order_by: Vec<QueryOrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
    after_cursor: Option<Cursor>,
    before_cursor: Option<Cursor>,
    first_count: Option<usize>,
    last_count: Option<usize>,
    preload_fields: BTreeSet<String>,
    _entity: PhantomData<fn() -> T>,
}

/// Field replacements for [`Query::copy_with`]. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryUpdate {
    pub filters: Option<Vec<QueryFilter>>,
    pub order_by: Option<Vec<QueryOrderBy>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub after_cursor: Option<Cursor>,
    pub before_cursor: Option<Cursor>,
    pub first_count: Option<usize>,
    pub last_count: Option<usize>,
    pub preload_fields: Option<BTreeSet<String>>,
}

fn positive(n: usize, what: &str) -> usize {
    assert!(n > 0, "{} must be positive, got {}", what, n);
    n
}

impl<T> Query<T> {
    /// Create an empty query
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            after_cursor: None,
            before_cursor: None,
            first_count: None,
            last_count: None,
            preload_fields: BTreeSet::new(),
            _entity: PhantomData,
        }
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn order_by(&self) -> &[QueryOrderBy] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn after_cursor(&self) -> Option<&Cursor> {
        self.after_cursor.as_ref()
    }

    pub fn before_cursor(&self) -> Option<&Cursor> {
        self.before_cursor.as_ref()
    }

    pub fn first_count(&self) -> Option<usize> {
        self.first_count
    }

    pub fn last_count(&self) -> Option<usize> {
        self.last_count
    }

    pub fn preload_fields(&self) -> &BTreeSet<String> {
        &self.preload_fields
    }

    /// Append a filter on a raw field name
    pub fn where_field(&self, field: impl Into<String>, condition: Condition) -> Self {
        let mut next = self.clone();
        next.filters.push(condition.into_filter(field));
        next
    }

    /// Append every filter an expression lowers to.
    ///
    /// Fails, leaving `self` untouched, when the expression contains an `Or`
    /// or a `Not` that cannot be inverted.
    pub fn where_expression(&self, expression: &Expression<T>) -> QueryResult<Self> {
        let lowered = expression.to_filters()?;
        let mut next = self.clone();
        next.filters.extend(lowered);
        Ok(next)
    }

    /// Append an ordering on a raw field name
    pub fn order_by_field(&self, field: impl Into<String>, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.order_by.push(QueryOrderBy::new(field, direction));
        next
    }

    /// Append an ordering on a typed field of `T`
    pub fn order_by_typed<F>(&self, field: &F, direction: SortDirection) -> Self
    where
        F: TypedField<T> + ?Sized,
    {
        self.order_by_field(field.name(), direction)
    }

    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn limit_to(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.limit = Some(positive(n, "limit"));
        next
    }

    pub fn offset_by(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.offset = Some(n);
        next
    }

    /// Only rows strictly after `cursor`
    pub fn after(&self, cursor: Cursor) -> Self {
        let mut next = self.clone();
        next.after_cursor = Some(cursor);
        next
    }

    /// Only rows strictly before `cursor`
    pub fn before(&self, cursor: Cursor) -> Self {
        let mut next = self.clone();
        next.before_cursor = Some(cursor);
        next
    }

    /// Take the first `n` rows of the cursor window
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn first(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.first_count = Some(positive(n, "first"));
        next
    }

    /// Take the last `n` rows of the cursor window
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn last(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.last_count = Some(positive(n, "last"));
        next
    }

    /// Add relations the adapter should load eagerly
    pub fn preload<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.preload_fields.extend(fields.into_iter().map(Into::into));
        next
    }

    pub fn preload_field(&self, field: impl Into<String>) -> Self {
        self.preload(std::iter::once(field))
    }

    /// Copy with the given fields replaced
    ///
    /// # Panics
    ///
    /// Panics if a replacement `limit`, `first_count` or `last_count` is zero.
    pub fn copy_with(&self, update: QueryUpdate) -> Self {
        let QueryUpdate {
            filters,
            order_by,
            limit,
            offset,
            after_cursor,
            before_cursor,
            first_count,
            last_count,
            preload_fields,
        } = update;

        Self {
            filters: filters.unwrap_or_else(|| self.filters.clone()),
            order_by: order_by.unwrap_or_else(|| self.order_by.clone()),
            limit: limit.map(|n| positive(n, "limit")).or(self.limit),
            offset: offset.or(self.offset),
            after_cursor: after_cursor.or_else(|| self.after_cursor.clone()),
            before_cursor: before_cursor.or_else(|| self.before_cursor.clone()),
            first_count: first_count.map(|n| positive(n, "first")).or(self.first_count),
            last_count: last_count.map(|n| positive(n, "last")).or(self.last_count),
            preload_fields: preload_fields.unwrap_or_else(|| self.preload_fields.clone()),
            _entity: PhantomData,
        }
    }

    /// Check if every field is at its default
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.order_by.is_empty()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.after_cursor.is_none()
            && self.before_cursor.is_none()
            && self.first_count.is_none()
            && self.last_count.is_none()
            && self.preload_fields.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Check if the query pages with cursors or first/last counts
    pub fn is_cursor_paged(&self) -> bool {
        self.after_cursor.is_some()
            || self.before_cursor.is_some()
            || self.first_count.is_some()
            || self.last_count.is_some()
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            after_cursor: self.after_cursor.clone(),
            before_cursor: self.before_cursor.clone(),
            first_count: self.first_count,
            last_count: self.last_count,
            preload_fields: self.preload_fields.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> PartialEq for Query<T> {
    fn eq(&self, other: &Self) -> bool {
        self.filters == other.filters
            && self.order_by == other.order_by
            && self.limit == other.limit
            && self.offset == other.offset
            && self.after_cursor == other.after_cursor
            && self.before_cursor == other.before_cursor
            && self.first_count == other.first_count
            && self.last_count == other.last_count
            && self.preload_fields == other.preload_fields
    }
}

impl<T> Eq for Query<T> {}

impl<T> Hash for Query<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.filters.hash(state);
        self.order_by.hash(state);
        self.limit.hash(state);
        self.offset.hash(state);
        self.after_cursor.hash(state);
        self.before_cursor.hash(state);
        self.first_count.hash(state);
        self.last_count.hash(state);
        self.preload_fields.hash(state);
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("after_cursor", &self.after_cursor)
            .field("before_cursor", &self.before_cursor)
            .field("first_count", &self.first_count)
            .field("last_count", &self.last_count)
            .field("preload_fields", &self.preload_fields)
            .finish()
    }
}
