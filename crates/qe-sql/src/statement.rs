//! Statement Rendering
//!
//! Renders the parts of a `SELECT` for a `Query<T>` using any
//! [`QueryTranslator`]. Values are inlined as escaped literals.
//!
//! Cursor bounds become keyset predicates over the query's ordering, so the
//! ordering should end in a unique column for pages to be stable.

use qe_core::{Cursor, QueryError, QueryResult, SqlConfig, Value};
use qe_queries::{FilterOperator, Query, QueryFilter, QueryOrderBy};

use crate::translator::{QueryTranslator, SqlTranslator};

/// Which side of a cursor a keyset predicate selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    /// Rows ordered after the cursor
    After,
    /// Rows ordered before the cursor
    Before,
}

/// A rendered statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    /// The ORDER BY is flipped; reverse fetched rows before returning them
    pub reversed: bool,
    /// Only the last `n` fetched rows belong to the page
    pub keep_last: Option<usize>,
}

impl SqlStatement {
    /// Put fetched rows into page order
    pub fn arrange<R>(&self, mut rows: Vec<R>) -> Vec<R> {
        if self.reversed {
            rows.reverse();
        }
        if let Some(n) = self.keep_last {
            let skip = rows.len().saturating_sub(n);
            rows.drain(..skip);
        }
        rows
    }
}

/// Renders SQL clauses with a translator
#[derive(Debug, Clone, Default)]
pub struct SqlRenderer<Tr = SqlTranslator> {
    translator: Tr,
    config: SqlConfig,
}

impl SqlRenderer<SqlTranslator> {
    pub fn new(config: SqlConfig) -> Self {
        Self::with_translator(SqlTranslator, config)
    }
}

impl<Tr: QueryTranslator> SqlRenderer<Tr> {
    pub fn with_translator(translator: Tr, config: SqlConfig) -> Self {
        Self { translator, config }
    }

    pub fn translator(&self) -> &Tr {
        &self.translator
    }

    /// Column or table name, quoted when configured
    pub fn identifier(&self, name: &str) -> String {
        if self.config.quote_identifiers {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    /// Quoted LIKE pattern for a text or array operator.
    ///
    /// `%`, `_` and `\` in the value are escaped with `\`, so the predicate
    /// must carry `ESCAPE '\'`. Returns `None` for other operators.
    pub fn like_pattern(&self, operator: FilterOperator, value: &Value) -> Option<String> {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let escaped = text
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = match operator {
            FilterOperator::Contains
            | FilterOperator::ArrayContains
            | FilterOperator::ArrayContainsAny => format!("%{}%", escaped),
            FilterOperator::StartsWith => format!("{}%", escaped),
            FilterOperator::EndsWith => format!("%{}", escaped),
            _ => return None,
        };
        Some(format!("'{}'", self.translator.escape_sql_string(&pattern)))
    }

    fn like(&self, column: &str, operator: FilterOperator, value: &Value) -> String {
        let pattern = self
            .like_pattern(operator, value)
            .unwrap_or_else(|| "''".to_string());
        format!(
            "{} {} {} ESCAPE '\\'",
            column,
            self.translator.operator_to_sql(operator),
            pattern
        )
    }

    /// Render one filter as a SQL predicate
    pub fn render_filter(&self, filter: &QueryFilter) -> String {
        let column = self.identifier(&filter.field);
        let op = filter.operator;
        let sql = match op {
            FilterOperator::Equals | FilterOperator::NotEquals if filter.value.is_null() => {
                let null_op = if op == FilterOperator::Equals {
                    FilterOperator::IsNull
                } else {
                    FilterOperator::IsNotNull
                };
                format!("{} {}", column, self.translator.operator_to_sql(null_op))
            }
            FilterOperator::Equals
            | FilterOperator::NotEquals
            | FilterOperator::LessThan
            | FilterOperator::LessThanOrEquals
            | FilterOperator::GreaterThan
            | FilterOperator::GreaterThanOrEquals => format!(
                "{} {} {}",
                column,
                self.translator.operator_to_sql(op),
                self.translator.format_sql_value(&filter.value)
            ),
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                format!("{} {}", column, self.translator.operator_to_sql(op))
            }
            FilterOperator::WhereIn | FilterOperator::WhereNotIn => {
                let items = as_items(&filter.value);
                if items.is_empty() {
                    // Nothing is in an empty set
                    let always = if op == FilterOperator::WhereIn { "1 = 0" } else { "1 = 1" };
                    always.to_string()
                } else {
                    format!(
                        "{} {} {}",
                        column,
                        self.translator.operator_to_sql(op),
                        self.translator.format_sql_value(&Value::List(items))
                    )
                }
            }
            FilterOperator::Contains
            | FilterOperator::StartsWith
            | FilterOperator::EndsWith
            | FilterOperator::ArrayContains => self.like(&column, op, &filter.value),
            FilterOperator::ArrayContainsAny => {
                let items = as_items(&filter.value);
                if items.is_empty() {
                    "1 = 0".to_string()
                } else {
                    let parts: Vec<String> = items
                        .iter()
                        .map(|item| self.like(&column, op, item))
                        .collect();
                    format!("({})", parts.join(" OR "))
                }
            }
        };
        tracing::trace!(field = %filter.field, operator = %op, sql = %sql, "Rendered filter");
        sql
    }

    /// AND-joined predicates, empty when there are no filters
    pub fn render_where(&self, filters: &[QueryFilter]) -> String {
        filters
            .iter()
            .map(|f| self.render_filter(f))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// `ORDER BY` clause, empty when there is no ordering.
    ///
    /// `reversed` flips every direction.
    pub fn render_order_by(&self, order: &[QueryOrderBy], reversed: bool) -> String {
        if order.is_empty() {
            return String::new();
        }

        let parts: Vec<String> = order
            .iter()
            .map(|o| {
                let descending = o.descending != reversed;
                let direction = if descending { "DESC" } else { "ASC" };
                format!("{} {}", self.identifier(&o.field), direction)
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Keyset predicate selecting rows on one side of `cursor`.
    ///
    /// For ordering `a, b` this is `(a > x) OR (a = x AND b > y)`, with `<`
    /// wherever the field sorts descending or the direction is `Before`.
    /// Only the leading ordering fields the cursor records take part, up to
    /// the first one it lacks; `None` when it lacks the first.
    pub fn render_cursor_predicate(
        &self,
        order: &[QueryOrderBy],
        cursor: &Cursor,
        direction: CursorDirection,
    ) -> Option<String> {
        let keys: Vec<(&QueryOrderBy, &Value)> = order
            .iter()
            .map_while(|o| cursor.get(&o.field).map(|v| (o, v)))
            .collect();
        if keys.is_empty() {
            return None;
        }

        let mut branches = Vec::with_capacity(keys.len());
        for (i, (key, value)) in keys.iter().enumerate() {
            let mut terms: Vec<String> = keys[..i]
                .iter()
                .map(|(prior, v)| {
                    format!(
                        "{} = {}",
                        self.identifier(&prior.field),
                        self.translator.format_sql_value(v)
                    )
                })
                .collect();
            let forward = (direction == CursorDirection::After) != key.descending;
            terms.push(format!(
                "{} {} {}",
                self.identifier(&key.field),
                if forward { ">" } else { "<" },
                self.translator.format_sql_value(value)
            ));
            branches.push(format!("({})", terms.join(" AND ")));
        }
        Some(branches.join(" OR "))
    }

    /// Full `SELECT` for `query` against `table`.
    ///
    /// Slices like the in-memory pager: `offset` and `limit` narrow the
    /// cursor window, `first` keeps its head and `last` its tail. A bare
    /// `last` flips the ordering and marks the statement `reversed`; with
    /// any other count it becomes `keep_last`. Pass fetched rows through
    /// [`SqlStatement::arrange`].
    pub fn render_select<T>(&self, table: &str, query: &Query<T>) -> QueryResult<SqlStatement> {
        let mut predicates: Vec<String> = query
            .filters()
            .iter()
            .map(|f| self.render_filter(f))
            .collect();

        let bounds = [
            (query.after_cursor(), CursorDirection::After),
            (query.before_cursor(), CursorDirection::Before),
        ];
        for (cursor, direction) in bounds {
            if let Some(cursor) = cursor {
                let predicate = self
                    .render_cursor_predicate(query.order_by(), cursor, direction)
                    .ok_or_else(|| QueryError::InvalidCursor {
                        reason: "cursor does not record the leading ordering field".to_string(),
                    })?;
                predicates.push(format!("({})", predicate));
            }
        }

        let reversed = query.last_count().is_some()
            && query.first_count().is_none()
            && query.limit().is_none()
            && query.offset().is_none();
        let (limit, keep_last) = if reversed {
            (query.last_count(), None)
        } else {
            let limit = match (query.limit(), query.first_count()) {
                (Some(limit), Some(first)) => Some(limit.min(first)),
                (limit, first) => limit.or(first),
            };
            (limit, query.last_count())
        };

        let mut sql = format!("SELECT * FROM {}", self.identifier(table));
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        let order = self.render_order_by(query.order_by(), reversed);
        if !order.is_empty() {
            sql.push(' ');
            sql.push_str(&order);
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = query.offset() {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        tracing::debug!(table, reversed, ?keep_last, sql = %sql, "Rendered select statement");
        Ok(SqlStatement {
            sql,
            reversed,
            keep_last,
        })
    }
}

/// List items, or the value itself as a single item
fn as_items(value: &Value) -> Vec<Value> {
    match value {
        Value::List(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qe_queries::{Condition, SortDirection};

    struct Task;

    fn renderer() -> SqlRenderer {
        SqlRenderer::new(SqlConfig::default())
    }

    fn filter(field: &str, op: FilterOperator, value: impl Into<Value>) -> String {
        renderer().render_filter(&QueryFilter::new(field, op, value))
    }

    #[test]
    fn test_comparison_filters() {
        assert_eq!(filter("status", FilterOperator::Equals, "open"), "status = 'open'");
        assert_eq!(filter("priority", FilterOperator::GreaterThan, 2), "priority > 2");
        assert_eq!(filter("done", FilterOperator::NotEquals, true), "done != 1");
        assert_eq!(filter("owner", FilterOperator::Equals, Value::Null), "owner IS NULL");
        assert_eq!(
            renderer().render_filter(&QueryFilter::is_not_null("owner")),
            "owner IS NOT NULL"
        );
    }

    #[test]
    fn test_membership_filters() {
        assert_eq!(
            filter("id", FilterOperator::WhereIn, vec![1, 2, 3]),
            "id IN (1, 2, 3)"
        );
        assert_eq!(
            filter("status", FilterOperator::WhereNotIn, vec!["done"]),
            "status NOT IN ('done')"
        );
        assert_eq!(filter("id", FilterOperator::WhereIn, Vec::<i64>::new()), "1 = 0");
        assert_eq!(filter("id", FilterOperator::WhereNotIn, Vec::<i64>::new()), "1 = 1");
    }

    #[test]
    fn test_like_filters() {
        assert_eq!(
            filter("title", FilterOperator::Contains, "50%_off"),
            "title LIKE '%50\\%\\_off%' ESCAPE '\\'"
        );
        assert_eq!(
            filter("title", FilterOperator::StartsWith, "O'Brien"),
            "title LIKE 'O''Brien%' ESCAPE '\\'"
        );
        assert_eq!(
            filter("title", FilterOperator::EndsWith, "\\"),
            "title LIKE '%\\\\' ESCAPE '\\'"
        );
        assert_eq!(
            filter("tags", FilterOperator::ArrayContains, "ui"),
            "tags LIKE '%ui%' ESCAPE '\\'"
        );
    }

    #[test]
    fn test_array_contains_any() {
        assert_eq!(
            filter("tags", FilterOperator::ArrayContainsAny, vec!["a", "b"]),
            "(tags LIKE '%a%' ESCAPE '\\' OR tags LIKE '%b%' ESCAPE '\\')"
        );
        assert_eq!(
            filter("tags", FilterOperator::ArrayContainsAny, Vec::<String>::new()),
            "1 = 0"
        );
    }

    #[test]
    fn test_like_pattern_rejects_other_operators() {
        assert!(renderer()
            .like_pattern(FilterOperator::Equals, &Value::from("x"))
            .is_none());
    }

    #[test]
    fn test_every_operator_renders() {
        for op in FilterOperator::ALL {
            let value = if op.takes_list() {
                Value::list(["x"])
            } else if op.requires_value() {
                Value::from("x")
            } else {
                Value::Null
            };
            let sql = filter("f", op, value);
            assert!(sql.starts_with("f ") || sql.starts_with("(f "), "{}: {}", op, sql);
        }
    }

    #[test]
    fn test_render_where() {
        let filters = vec![
            QueryFilter::equals("status", "open"),
            QueryFilter::new("priority", FilterOperator::GreaterThanOrEquals, 3),
        ];
        assert_eq!(
            renderer().render_where(&filters),
            "status = 'open' AND priority >= 3"
        );
        assert_eq!(renderer().render_where(&[]), "");
    }

    #[test]
    fn test_render_order_by() {
        let order = vec![QueryOrderBy::desc("updated_at"), QueryOrderBy::asc("id")];
        assert_eq!(
            renderer().render_order_by(&order, false),
            "ORDER BY updated_at DESC, id ASC"
        );
        assert_eq!(
            renderer().render_order_by(&order, true),
            "ORDER BY updated_at ASC, id DESC"
        );
        assert_eq!(renderer().render_order_by(&[], false), "");
    }

    #[test]
    fn test_quoted_identifiers() {
        let r = SqlRenderer::new(SqlConfig {
            quote_identifiers: true,
        });
        assert_eq!(r.identifier("order"), "\"order\"");
        assert_eq!(r.identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(
            r.render_filter(&QueryFilter::equals("order", 1)),
            "\"order\" = 1"
        );
    }

    #[test]
    fn test_cursor_predicate() {
        let order = vec![QueryOrderBy::asc("name"), QueryOrderBy::desc("id")];
        let cursor = Cursor::from_values([("name", Value::from("B")), ("id", Value::from(2))]);

        assert_eq!(
            renderer()
                .render_cursor_predicate(&order, &cursor, CursorDirection::After)
                .unwrap(),
            "(name > 'B') OR (name = 'B' AND id < 2)"
        );
        assert_eq!(
            renderer()
                .render_cursor_predicate(&order, &cursor, CursorDirection::Before)
                .unwrap(),
            "(name < 'B') OR (name = 'B' AND id > 2)"
        );

        let unrelated = Cursor::from_values([("_index", 4)]);
        assert!(renderer()
            .render_cursor_predicate(&order, &unrelated, CursorDirection::After)
            .is_none());
    }

    #[test]
    fn test_select_empty_query() {
        let stmt = renderer().render_select("tasks", &Query::<Task>::new()).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks");
        assert!(!stmt.reversed);
    }

    #[test]
    fn test_select_forward_page() {
        let cursor = Cursor::from_values([("id", 10)]);
        let query = Query::<Task>::new()
            .where_field("status", Condition::equals("open"))
            .order_by_field("id", SortDirection::Asc)
            .after(cursor)
            .first(20);

        let stmt = renderer().render_select("tasks", &query).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM tasks WHERE status = 'open' AND ((id > 10)) ORDER BY id ASC LIMIT 20"
        );
        assert!(!stmt.reversed);
    }

    #[test]
    fn test_select_backward_page_is_reversed() {
        let cursor = Cursor::from_values([("id", 10)]);
        let query = Query::<Task>::new()
            .order_by_field("id", SortDirection::Asc)
            .before(cursor)
            .last(5);

        let stmt = renderer().render_select("tasks", &query).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM tasks WHERE ((id < 10)) ORDER BY id DESC LIMIT 5"
        );
        assert!(stmt.reversed);
    }

    #[test]
    fn test_select_limit_precedence() {
        let base = Query::<Task>::new().limit_to(100).offset_by(40);
        let stmt = renderer().render_select("tasks", &base).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks LIMIT 100 OFFSET 40");

        let stmt = renderer().render_select("tasks", &base.first(10).last(3)).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks LIMIT 10 OFFSET 40");
        assert!(!stmt.reversed);
        assert_eq!(stmt.keep_last, Some(3));

        let stmt = renderer().render_select("tasks", &base.first(500)).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks LIMIT 100 OFFSET 40");
        assert_eq!(stmt.keep_last, None);
    }

    #[test]
    fn test_first_and_last_keep_tail_of_head() {
        let query = Query::<Task>::new()
            .order_by_field("id", SortDirection::Asc)
            .first(4)
            .last(2);
        let stmt = renderer().render_select("tasks", &query).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks ORDER BY id ASC LIMIT 4");
        assert!(!stmt.reversed);
        assert_eq!(stmt.arrange(vec![1, 2, 3, 4]), vec![3, 4]);
        assert_eq!(stmt.arrange(vec![1]), vec![1]);
    }

    #[test]
    fn test_last_with_offset_is_not_reversed() {
        let query = Query::<Task>::new()
            .order_by_field("id", SortDirection::Asc)
            .offset_by(2)
            .last(2);
        let stmt = renderer().render_select("tasks", &query).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tasks ORDER BY id ASC OFFSET 2");
        assert!(!stmt.reversed);
        assert_eq!(stmt.arrange(vec![3, 4, 5, 6]), vec![5, 6]);
    }

    #[test]
    fn test_arrange_reversed_rows() {
        let query = Query::<Task>::new()
            .order_by_field("id", SortDirection::Asc)
            .last(3);
        let stmt = renderer().render_select("tasks", &query).unwrap();
        assert!(stmt.reversed);
        assert_eq!(stmt.keep_last, None);
        assert_eq!(stmt.arrange(vec![9, 8, 7]), vec![7, 8, 9]);
    }

    #[test]
    fn test_cursor_predicate_uses_leading_prefix() {
        let order = vec![
            QueryOrderBy::asc("name"),
            QueryOrderBy::asc("score"),
            QueryOrderBy::desc("id"),
        ];
        let gap = Cursor::from_values([("name", Value::from("B")), ("id", Value::from(2))]);
        assert_eq!(
            renderer()
                .render_cursor_predicate(&order, &gap, CursorDirection::After)
                .unwrap(),
            "(name > 'B')"
        );

        let id_only = Cursor::from_values([("id", 4)]);
        assert!(renderer()
            .render_cursor_predicate(&order, &id_only, CursorDirection::Before)
            .is_none());

        let query = Query::<Task>::new()
            .order_by_field("name", SortDirection::Asc)
            .after(id_only);
        assert!(matches!(
            renderer().render_select("tasks", &query),
            Err(QueryError::InvalidCursor { .. })
        ));
    }

    #[test]
    fn test_select_rejects_unusable_cursor() {
        let query = Query::<Task>::new()
            .order_by_field("id", SortDirection::Asc)
            .after(Cursor::from_values([("_index", 3)]));

        assert!(matches!(
            renderer().render_select("tasks", &query),
            Err(QueryError::InvalidCursor { .. })
        ));
    }
}
