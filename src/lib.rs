//! Listing Harvester: a two-phase listing/detail crawler
//!
//! This crate walks the numbered pages of a paginated listing site, collects the
//! detail-page links found on each listing page, then visits those detail pages
//! and appends one fixed-schema record per page to an append-only tabular store.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod filter;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Listing Harvester operations
///
/// Page-level problems (a 404, a wrong content type, a page whose shape does not
/// match the extractor) never surface here; they are logged and skipped by the
/// crawler. This type carries the conditions that stop a crawl from starting.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Record sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("Worker pool closed unexpectedly")]
    WorkerPool,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use extract::{AppPageExtractor, Extractor};
pub use output::{CsvSink, Record, RecordSink};
pub use state::{CancelFlag, CrawlPhase};
pub use url::canonicalize;
