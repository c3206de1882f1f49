//! Query Translator
//!
//! Maps filter operators to SQL operator text and turns `Value`s into SQL
//! literals. Storage adapters implement [`QueryTranslator`] and override
//! whichever piece their dialect does differently.

use chrono::SecondsFormat;
use qe_core::Value;
use qe_queries::FilterOperator;

/// Operator and literal rendering shared by SQL adapters
pub trait QueryTranslator {
    /// SQL operator text for a filter operator
    fn operator_to_sql(&self, operator: FilterOperator) -> &'static str {
        match operator {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEquals => "<=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEquals => ">=",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
            FilterOperator::WhereIn => "IN",
            FilterOperator::WhereNotIn => "NOT IN",
            FilterOperator::Contains
            | FilterOperator::StartsWith
            | FilterOperator::EndsWith
            | FilterOperator::ArrayContains
            | FilterOperator::ArrayContainsAny => "LIKE",
        }
    }

    /// Escape a string for use inside single quotes
    fn escape_sql_string(&self, s: &str) -> String {
        s.replace('\'', "''")
    }

    /// Render a value as a SQL literal.
    ///
    /// Strings and timestamps are quoted, booleans become `1`/`0` and lists
    /// render as a parenthesized, comma-separated group. Non-finite floats
    /// have no SQL literal and render as `NULL`.
    fn format_sql_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) if x.is_finite() => x.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::String(s) => format!("'{}'", self.escape_sql_string(s)),
            Value::DateTime(dt) => format!("'{}'", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.format_sql_value(v)).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

/// Translator with the default ANSI-style rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTranslator;

impl QueryTranslator for SqlTranslator {}
