//! # qe-core
//!
//! Core types shared by the query engine crates.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Dynamic filter values (`Value`)
//! - Error types and the `QueryResult` alias
//! - Opaque pagination cursors
//! - Page metadata (`PageInfo`, `PagedResult`)
//! - Configuration types

pub mod config;
pub mod cursor;
pub mod error;
pub mod pagination;
pub mod types;

pub use config::{CursorStrategy, EngineConfig, PaginationConfig, SqlConfig};
pub use cursor::Cursor;
pub use error::*;
pub use pagination::*;
pub use types::*;
