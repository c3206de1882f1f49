//! # qe-sql
//!
//! SQL generation for the query engine.
//!
//! - `translator` - Operator mapping, string escaping and literal formatting
//! - `statement` - `WHERE`/`ORDER BY`/keyset/`LIMIT` rendering for a `Query<T>`
//!
//! Values are inlined as escaped literals. Adapters that bind parameters
//! can implement [`QueryTranslator`] and reuse the renderer unchanged.

pub mod statement;
pub mod translator;

pub use statement::{CursorDirection, SqlRenderer, SqlStatement};
pub use translator::{QueryTranslator, SqlTranslator};
