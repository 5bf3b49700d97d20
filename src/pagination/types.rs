//! Pagination types and traits
//!
//! Defines the core pagination abstractions.

use crate::error::{Error, Result};
use serde_json::Value;

/// Page size Aircall uses when `per_page` is not given
pub const DEFAULT_PER_PAGE: u32 = 20;

/// First page number
pub const FIRST_PAGE: u32 = 1;

/// Query parameters selecting one page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub per_page: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageParams {
    /// Create page params
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Render as query parameters
    pub fn to_query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue(PageParams),
    /// No more pages
    Done,
}

/// Tracks pagination progress for one stream (or one child context)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Another request is due; `None` means the first page
    HasMore {
        /// Params of the next page, absent for the first request
        cursor: Option<PageParams>,
    },
    /// The listing is exhausted
    Exhausted,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::HasMore { cursor: None }
    }
}

impl PaginationState {
    /// Create a new pagination state, pointing at the first page
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the outcome of a page into the state.
    ///
    /// A link back to the page just fetched is a decode error, and the
    /// state is left unchanged.
    pub fn advance(&mut self, next: NextPage) -> Result<()> {
        *self = match (*self, next) {
            (_, NextPage::Done) => Self::Exhausted,
            (Self::HasMore { cursor }, NextPage::Continue(params))
                if params == cursor.unwrap_or_default() =>
            {
                return Err(Error::decode(format!(
                    "Loop detected in pagination: next page link points back to page {} (per_page {})",
                    params.page, params.per_page
                )));
            }
            (_, NextPage::Continue(params)) => Self::HasMore {
                cursor: Some(params),
            },
        };
        Ok(())
    }
}

/// Core trait for pagination strategies.
///
/// Implementations only look at the page just received, never at earlier
/// ones, so a single paginator serves every stream and context.
pub trait Paginator: Send + Sync {
    /// Decide whether another page follows the given body
    fn next_page(&self, body: &Value, records_count: usize) -> Result<NextPage>;
}
