use crate::UrlError;
use url::Url;

/// Placeholder marking the page number in a root URL
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Query parameter recognised as the page number
const PAGE_QUERY_KEY: &str = "page";

/// Where the page number lives in a listing URL
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageSlot {
    /// Literal `{page}` in the URL text
    Placeholder,
    /// Numeric `page=N` query parameter
    Query,
    /// Last all-digit path segment (index into the segment list)
    PathSegment(usize),
    /// No page component; only page 1 exists
    Fixed,
}

/// A listing URL with a substitutable page number
///
/// Listing pages are addressed by URL structure rather than by following "next
/// page" links. The page component is located once, in this order:
///
/// 1. a literal `{page}` placeholder anywhere in the URL
/// 2. a numeric `page` query parameter
/// 3. the last path segment consisting only of digits
///
/// A URL with none of these has a single page.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::PageTemplate;
///
/// let template = PageTemplate::parse("http://www.appfun.cn/soft/applist/cid/9/page/1").unwrap();
/// assert_eq!(
///     template.page_url(3).as_deref(),
///     Some("http://www.appfun.cn/soft/applist/cid/9/page/3")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PageTemplate {
    raw: String,
    url: Url,
    slot: PageSlot,
}

impl PageTemplate {
    /// Parses a root URL and locates its page component
    pub fn parse(root: &str) -> Result<Self, UrlError> {
        if root.contains(PAGE_PLACEHOLDER) {
            let first = root.replace(PAGE_PLACEHOLDER, "1");
            let url = parse_listing_url(&first)?;
            return Ok(Self {
                raw: root.to_string(),
                url,
                slot: PageSlot::Placeholder,
            });
        }

        let url = parse_listing_url(root)?;

        let slot = if url.query().is_some_and(|q| q.split('&').any(is_page_pair)) {
            PageSlot::Query
        } else if let Some(index) = last_numeric_segment(&url) {
            PageSlot::PathSegment(index)
        } else {
            PageSlot::Fixed
        };

        Ok(Self {
            raw: root.to_string(),
            url,
            slot,
        })
    }

    /// Returns true if pages other than page 1 can be addressed
    pub fn is_paginated(&self) -> bool {
        self.slot != PageSlot::Fixed
    }

    /// The root URL as parsed
    pub fn root(&self) -> &Url {
        &self.url
    }

    /// Builds the URL of the given page
    ///
    /// Returns None for page 0, and for pages above 1 when the root has no page
    /// component.
    pub fn page_url(&self, page: u32) -> Option<String> {
        if page == 0 {
            return None;
        }

        match &self.slot {
            PageSlot::Placeholder => Some(self.raw.replace(PAGE_PLACEHOLDER, &page.to_string())),
            PageSlot::Query => {
                // Other pairs keep their original encoding
                let query = self
                    .url
                    .query()
                    .unwrap_or_default()
                    .split('&')
                    .map(|pair| {
                        if is_page_pair(pair) {
                            format!("{}={}", PAGE_QUERY_KEY, page)
                        } else {
                            pair.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                let mut url = self.url.clone();
                url.set_query(Some(&query));
                Some(url.to_string())
            }
            PageSlot::PathSegment(index) => {
                let mut segments: Vec<String> = self
                    .url
                    .path_segments()
                    .map(|s| s.map(str::to_string).collect::<Vec<_>>())
                    .unwrap_or_default();
                let slot = segments.get_mut(*index)?;
                *slot = page.to_string();
                let mut url = self.url.clone();
                url.set_path(&format!("/{}", segments.join("/")));
                Some(url.to_string())
            }
            PageSlot::Fixed => (page == 1).then(|| self.url.to_string()),
        }
    }
}

fn parse_listing_url(text: &str) -> Result<Url, UrlError> {
    let url = Url::parse(text).map_err(|e| UrlError::Parse(format!("{}: {}", text, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

fn is_page_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// A raw `page=<digits>` query pair
fn is_page_pair(pair: &str) -> bool {
    matches!(pair.split_once('='), Some((PAGE_QUERY_KEY, value)) if is_page_number(value))
}

fn last_numeric_segment(url: &Url) -> Option<usize> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments.iter().rposition(|s| is_page_number(s))
}
