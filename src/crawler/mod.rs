//! Crawler module for web page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - The listing-page frontier
//! - Overall crawl coordination across both phases

mod coordinator;
mod fetcher;
mod frontier;
mod retry;

pub use coordinator::{consolidate_links, run_crawl, Consolidation, Coordinator};
pub use fetcher::{
    build_http_client, fetch_url, is_html, FailureKind, FetchFailure, FetchOutcome, FetchedPage,
    HTML_CONTENT_TYPES, MAX_REDIRECTS,
};
pub use frontier::{seed_listing_pages, Frontier, FrontierEntry};
pub use retry::{fetch_with_retry, RetryPolicy};
