//! Crawl statistics and the end-of-crawl summary

use crate::state::CrawlPhase;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Why a page was skipped
///
/// Every page-level failure is recovered where it happens and counted under
/// one of these classes; none of them stops the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureClass {
    /// Timeout, connection error or non-2xx status
    TransportFailure,
    /// Response was not HTML
    WrongContentType,
    /// Body was empty or could not be read as a document
    ParseFailure,
    /// Detail page lacked an element the extractor requires
    ExtractionMismatch,
    /// Candidate URL had no resolvable host
    HostResolutionFailure,
    /// Record could not be appended to the store
    SinkFailure,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::TransportFailure => "transport_failure",
            FailureClass::WrongContentType => "wrong_content_type",
            FailureClass::ParseFailure => "parse_failure",
            FailureClass::ExtractionMismatch => "extraction_mismatch",
            FailureClass::HostResolutionFailure => "host_resolution_failure",
            FailureClass::SinkFailure => "sink_failure",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Phase the run ended in
    pub phase: CrawlPhase,

    /// Listing pages seeded into the frontier
    pub listing_pages_seeded: u64,

    /// Listing pages fetched successfully
    pub listing_pages_fetched: u64,

    /// Raw hrefs harvested from listing pages (duplicates included)
    pub links_harvested: u64,

    /// Distinct detail candidates after consolidation
    pub candidates: u64,

    /// Detail pages fetched successfully
    pub detail_pages_fetched: u64,

    /// Records extracted from detail pages
    pub records_extracted: u64,

    /// Records appended to the sink
    pub records_written: u64,

    /// Filter rejections, keyed by predicate name
    pub rejections: BTreeMap<&'static str, u64>,

    /// Skipped pages, keyed by failure class
    pub failures: BTreeMap<FailureClass, u64>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Whether the run stopped early on request
    pub cancelled: bool,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self {
            phase: CrawlPhase::Seeding,
            listing_pages_seeded: 0,
            listing_pages_fetched: 0,
            links_harvested: 0,
            candidates: 0,
            detail_pages_fetched: 0,
            records_extracted: 0,
            records_written: 0,
            rejections: BTreeMap::new(),
            failures: BTreeMap::new(),
            elapsed: Duration::ZERO,
            cancelled: false,
        }
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, class: FailureClass) {
        *self.failures.entry(class).or_insert(0) += 1;
    }

    pub fn record_rejection(&mut self, filter: &'static str) {
        *self.rejections.entry(filter).or_insert(0) += 1;
    }

    pub fn failure_count(&self, class: FailureClass) -> u64 {
        self.failures.get(&class).copied().unwrap_or(0)
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn total_rejections(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Pages fetched successfully in either phase
    pub fn pages_fetched(&self) -> u64 {
        self.listing_pages_fetched + self.detail_pages_fetched
    }
}

/// Prints the end-of-crawl summary to stderr
pub fn print_statistics(stats: &CrawlStats) {
    eprintln!(
        "Crawling finished in {} seconds",
        stats.elapsed.as_secs_f64().round() as u64
    );
    if stats.cancelled {
        eprintln!("Crawl was cancelled before completion");
    }
    eprintln!();

    eprintln!("Overview:");
    eprintln!("  Listing pages seeded: {}", stats.listing_pages_seeded);
    eprintln!("  Listing pages fetched: {}", stats.listing_pages_fetched);
    eprintln!("  Links harvested: {}", stats.links_harvested);
    eprintln!("  Detail candidates: {}", stats.candidates);
    eprintln!("  Detail pages fetched: {}", stats.detail_pages_fetched);
    eprintln!("  Records extracted: {}", stats.records_extracted);
    eprintln!("  Records written: {}", stats.records_written);
    eprintln!();

    if !stats.rejections.is_empty() {
        eprintln!("Filter Rejections:");
        for (filter, count) in &stats.rejections {
            eprintln!("  {}: {}", filter, count);
        }
        eprintln!();
    }

    if !stats.failures.is_empty() {
        eprintln!("Skipped Pages:");
        // Sort by count (descending)
        let mut failure_counts: Vec<_> = stats.failures.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (class, count) in failure_counts {
            eprintln!("  {}: {}", class, count);
        }
        eprintln!();
    }
}
