//! Pagination module
//!
//! Aircall paginates listings with a HATEOAS-style link: every page carries
//! `meta.next_page_link`, the full URL of the following page. The tap does
//! not follow that URL verbatim; it lifts `page` and `per_page` from its
//! query string and re-issues the request against the stream path so the
//! incremental parameters stay under the tap's control.

mod strategies;
mod types;

pub use strategies::NextPageLinkPaginator;
pub use types::{NextPage, PageParams, PaginationState, Paginator};
