//! Page extraction
//!
//! An `Extractor` works in one of two modes on a parsed document:
//! - link harvest: the detail-page hrefs found on a listing page
//! - record extraction: the site fields of a detail page, or an
//!   `ExtractionError` when the page does not have the expected shape
//!
//! The document tree is built from the fetched body right where it is used,
//! since `scraper::Html` cannot move between worker tasks.

mod app_page;

pub use app_page::{AppPageExtractor, MIN_DETAIL_ENTRIES};

use crate::crawler::{FetchOutcome, FetchedPage};
use crate::output::{Field, Record, RecordBuilder, UnsetField};
use scraper::Html;
use thiserror::Error;

/// Format of the `Crawl Time` field
pub const CRAWL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Why a detail page produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("expected at least {expected} detail entries, found {found}")]
    TooFewDetails { expected: usize, found: usize },

    #[error("page body is empty")]
    EmptyDocument,

    #[error(transparent)]
    Incomplete(#[from] UnsetField),
}

/// Site-specific extraction strategy
pub trait Extractor: Send + Sync {
    /// Detail-page hrefs of a listing page, in document order
    ///
    /// Hrefs are returned as written (possibly relative, possibly repeated).
    fn harvest_links(&self, document: &Html) -> Vec<String>;

    /// Fills every site field of a detail page
    ///
    /// `App Link` and `Crawl Time` are left unset; `extract_page` stamps them.
    /// A missing structural element fails the whole page.
    fn extract_record(&self, document: &Html) -> Result<RecordBuilder, ExtractionError>;
}

/// Links harvested from one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkHarvest {
    pub links: Vec<String>,
    /// False when the page could not be fetched or its body was empty.
    /// A usable page with no links simply had no entries.
    pub usable: bool,
}

impl LinkHarvest {
    pub fn unusable() -> Self {
        Self::default()
    }
}

/// Harvests detail links from the outcome of a listing-page fetch
pub fn harvest_page(outcome: &FetchOutcome, extractor: &dyn Extractor) -> LinkHarvest {
    match outcome {
        FetchOutcome::Success(page) => {
            if page.is_empty() {
                tracing::warn!("Listing page {} has an empty body", page.url);
                return LinkHarvest::unusable();
            }
            let links = extractor.harvest_links(&page.document());
            tracing::debug!("Harvested {} links from {}", links.len(), page.url);
            LinkHarvest {
                links,
                usable: true,
            }
        }
        FetchOutcome::SkippedWrongType { .. } | FetchOutcome::Failed(_) => {
            LinkHarvest::unusable()
        }
    }
}

/// Extracts a complete record from a fetched detail page
///
/// Stamps `App Link` with `source_url` and `Crawl Time` with the current local
/// time.
pub fn extract_page(
    page: &FetchedPage,
    extractor: &dyn Extractor,
    source_url: &str,
) -> Result<Record, ExtractionError> {
    if page.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    let mut builder = extractor.extract_record(&page.document())?;
    builder
        .set(Field::AppLink, source_url)
        .set(Field::CrawlTime, crawl_timestamp());

    Ok(builder.build()?)
}

/// Current local time in `CRAWL_TIME_FORMAT`
pub fn crawl_timestamp() -> String {
    chrono::Local::now().format(CRAWL_TIME_FORMAT).to_string()
}
