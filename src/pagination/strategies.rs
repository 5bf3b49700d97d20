//! Pagination strategy implementations

use super::types::{NextPage, PageParams, Paginator, DEFAULT_PER_PAGE, FIRST_PAGE};
use crate::decode::{JsonPath, Segment};
use crate::error::{Error, Result};
use serde_json::Value;
use tracing::debug;
use url::Url;

// ============================================================================
// Next Page Link Pagination
// ============================================================================

/// Follows the `meta.next_page_link` URL Aircall returns with each listing.
///
/// ```json
/// { "calls": [...],
///   "meta": { "next_page_link": "https://api.aircall.io/v1/calls?page=2&per_page=20" } }
/// ```
#[derive(Debug, Clone)]
pub struct NextPageLinkPaginator {
    /// Where the link lives in the response body
    link_path: JsonPath,
}

impl Default for NextPageLinkPaginator {
    fn default() -> Self {
        Self {
            link_path: JsonPath::from_segments(
                "$.meta.next_page_link",
                vec![
                    Segment::Child("meta".to_string()),
                    Segment::Child("next_page_link".to_string()),
                ],
            ),
        }
    }
}

impl NextPageLinkPaginator {
    /// Create a paginator reading `$.meta.next_page_link`
    pub fn new() -> Self {
        Self::default()
    }
}

impl Paginator for NextPageLinkPaginator {
    fn next_page(&self, body: &Value, records_count: usize) -> Result<NextPage> {
        if records_count == 0 {
            debug!("Empty page, pagination complete");
            return Ok(NextPage::Done);
        }

        let link = match self.link_path.first(body) {
            None | Some(Value::Null) => return Ok(NextPage::Done),
            Some(Value::String(link)) if link.trim().is_empty() => return Ok(NextPage::Done),
            Some(Value::String(link)) => link,
            Some(other) => {
                return Err(Error::decode(format!(
                    "{} should be a URL string, found {other}",
                    self.link_path
                )));
            }
        };

        let params = parse_page_params(link)?;
        debug!(page = params.page, per_page = params.per_page, "Next page");
        Ok(NextPage::Continue(params))
    }
}

/// Read `page` and `per_page` from a next-page URL
pub(crate) fn parse_page_params(link: &str) -> Result<PageParams> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        // Relative links only need their query string
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("https://api.aircall.io/")?.join(link)?
        }
        Err(e) => return Err(e.into()),
    };

    let mut params = PageParams::new(FIRST_PAGE, DEFAULT_PER_PAGE);
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page" => params.page = parse_number("page", &value, link)?,
            "per_page" => params.per_page = parse_number("per_page", &value, link)?,
            _ => {}
        }
    }
    Ok(params)
}

fn parse_number(name: &str, value: &str, link: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| {
        Error::decode(format!(
            "'{name}' in next page link '{link}' is not a page number: '{value}'"
        ))
    })
}
