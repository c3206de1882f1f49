//! In-memory page construction
//!
//! Applies a `Query<T>` to a candidate row set held in memory: filter, sort,
//! bound by cursors, slice, then describe the slice with `PageInfo`.
//!
//! Rows are sorted by the query's `order_by` followed by a tiebreaker field
//! so the order is total and a cursor always identifies one position.

use std::cmp::Ordering;

use qe_core::{
    Cursor, CursorStrategy, PageInfo, PagedResult, PaginationConfig, QueryError, QueryResult,
    Value,
};

use crate::eval::{matches_all, Record};
use crate::query::Query;
use crate::sorts::{sorts_by, QueryOrderBy};

/// Cursor field used by [`CursorStrategy::Positional`]
pub const POSITION_FIELD: &str = "_index";

/// Pager settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Field appended to the ordering so that it is total
    pub tiebreaker_field: String,
    pub cursor_strategy: CursorStrategy,
    /// Fill in `PageInfo::total_count`
    pub include_total_count: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self::from(&PaginationConfig::default())
    }
}

impl From<&PaginationConfig> for PageOptions {
    fn from(config: &PaginationConfig) -> Self {
        Self {
            tiebreaker_field: config.tiebreaker_field.clone(),
            cursor_strategy: config.cursor_strategy,
            include_total_count: config.include_total_count,
        }
    }
}

impl PageOptions {
    pub fn with_strategy(mut self, strategy: CursorStrategy) -> Self {
        self.cursor_strategy = strategy;
        self
    }

    pub fn without_total_count(mut self) -> Self {
        self.include_total_count = false;
        self
    }
}

struct Entry<R> {
    key: Vec<Value>,
    row: R,
}

/// Build one page of `rows` as described by `query`.
///
/// A keyset cursor must record a leading prefix of the ordering keys; rows
/// are compared against that prefix only, so a cursor holding just the
/// first key skips every row tied with it. Fails with
/// [`QueryError::InvalidCursor`] when a cursor lacks the first ordering key
/// or the position the configured strategy needs.
pub fn paginate<T, R, I>(
    rows: I,
    query: &Query<T>,
    options: &PageOptions,
) -> QueryResult<PagedResult<R>>
where
    R: Record,
    I: IntoIterator<Item = R>,
{
    let keys = sort_keys(query.order_by(), &options.tiebreaker_field);

    let mut entries: Vec<Entry<R>> = rows
        .into_iter()
        .filter(|row| matches_all(query.filters(), row))
        .map(|row| Entry {
            key: keys
                .iter()
                .map(|k| row.field(&k.field).unwrap_or(Value::Null))
                .collect(),
            row,
        })
        .collect();
    entries.sort_by(|a, b| compare_keys(&a.key, &b.key, &keys));

    let total = entries.len();

    // Cursor window
    let mut start = 0;
    let mut end = total;
    if let Some(cursor) = query.after_cursor() {
        start = match options.cursor_strategy {
            CursorStrategy::Keyset => {
                let anchor = keyset_anchor(cursor, &keys)?;
                entries.partition_point(|e| compare_to_anchor(&e.key, &anchor, &keys).is_le())
            }
            CursorStrategy::Positional => position(cursor)?.saturating_add(1).min(total),
        };
    }
    if let Some(cursor) = query.before_cursor() {
        end = match options.cursor_strategy {
            CursorStrategy::Keyset => {
                let anchor = keyset_anchor(cursor, &keys)?;
                entries.partition_point(|e| compare_to_anchor(&e.key, &anchor, &keys).is_lt())
            }
            CursorStrategy::Positional => position(cursor)?.min(total),
        };
    }
    let end = end.max(start);

    // offset/limit narrow the window before first/last slice it
    let start = start.saturating_add(query.offset().unwrap_or(0)).min(end);
    let end = match query.limit() {
        Some(limit) => end.min(start.saturating_add(limit)),
        None => end,
    };

    let end = match query.first_count() {
        Some(first) => end.min(start.saturating_add(first)),
        None => end,
    };
    let start = match query.last_count() {
        Some(last) => start.max(end.saturating_sub(last)),
        None => start,
    };

    let mut page_info = PageInfo {
        has_next_page: end < total,
        has_previous_page: start > 0,
        start_cursor: None,
        end_cursor: None,
        total_count: None,
    };
    if start < end {
        page_info.start_cursor = Some(make_cursor(&entries[start], start, &keys, options));
        page_info.end_cursor = Some(make_cursor(&entries[end - 1], end - 1, &keys, options));
    }
    if options.include_total_count {
        page_info = page_info.with_total_count(total);
    }

    tracing::debug!(
        candidates = total,
        returned = end - start,
        has_next_page = page_info.has_next_page,
        has_previous_page = page_info.has_previous_page,
        "Built page"
    );

    let items = entries
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(|e| e.row)
        .collect();
    Ok(PagedResult::new(items, page_info))
}

/// Ordering keys: the query's order followed by the tiebreaker
fn sort_keys(order_by: &[QueryOrderBy], tiebreaker: &str) -> Vec<QueryOrderBy> {
    let mut keys = order_by.to_vec();
    if !sorts_by(order_by, tiebreaker) {
        keys.push(QueryOrderBy::asc(tiebreaker));
    }
    keys
}

fn directed(ord: Ordering, key: &QueryOrderBy) -> Ordering {
    if key.descending {
        ord.reverse()
    } else {
        ord
    }
}

fn compare_keys(a: &[Value], b: &[Value], keys: &[QueryOrderBy]) -> Ordering {
    a.iter()
        .zip(b)
        .zip(keys)
        .map(|((x, y), key)| directed(x.sort_cmp(y), key))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Anchor values for the leading keys the cursor records, up to the first
/// key it lacks
fn keyset_anchor(cursor: &Cursor, keys: &[QueryOrderBy]) -> QueryResult<Vec<Value>> {
    let anchor: Vec<Value> = keys
        .iter()
        .map_while(|k| cursor.get(&k.field).cloned())
        .collect();
    match keys.first() {
        Some(leading) if anchor.is_empty() => Err(QueryError::InvalidCursor {
            reason: format!("cursor does not record leading ordering field {}", leading.field),
        }),
        _ => Ok(anchor),
    }
}

fn compare_to_anchor(key: &[Value], anchor: &[Value], keys: &[QueryOrderBy]) -> Ordering {
    compare_keys(&key[..anchor.len().min(key.len())], anchor, keys)
}

fn position(cursor: &Cursor) -> QueryResult<usize> {
    cursor
        .get(POSITION_FIELD)
        .and_then(Value::as_i64)
        .and_then(|index| usize::try_from(index).ok())
        .ok_or_else(|| QueryError::InvalidCursor {
            reason: format!("missing or negative {}", POSITION_FIELD),
        })
}

fn make_cursor<R>(
    entry: &Entry<R>,
    index: usize,
    keys: &[QueryOrderBy],
    options: &PageOptions,
) -> Cursor {
    match options.cursor_strategy {
        CursorStrategy::Keyset => Cursor::from_values(
            keys.iter()
                .zip(&entry.key)
                .map(|(k, v)| (k.field.clone(), v.clone())),
        ),
        CursorStrategy::Positional => {
            Cursor::from_values([(POSITION_FIELD, Value::Int(index as i64))])
        }
    }
}
