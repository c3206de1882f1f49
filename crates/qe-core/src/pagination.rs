//! Pagination result types
//!
//! Relay-style page metadata returned alongside a page of rows. The values
//! are computed by the pager from the rows and the query that produced them.

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;

/// Navigation metadata for one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Rows exist after the last returned item
    pub has_next_page: bool,

    /// Rows exist before the first returned item
    pub has_previous_page: bool,

    /// Cursor of the first returned item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<Cursor>,

    /// Cursor of the last returned item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<Cursor>,

    /// Candidate count after filtering, before paging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

impl PageInfo {
    /// Page metadata for an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_total_count(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }
}

/// A page of items plus its navigation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Empty page with no cursors and both flags unset
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_info: PageInfo::empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_info.has_previous_page
    }

    /// Convert the items (e.g. rows into domain entities), keeping the page info
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
