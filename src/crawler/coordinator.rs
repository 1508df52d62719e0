//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a crawl through its phases:
//! - Seeding the frontier with numbered listing pages
//! - Fetching listing pages and harvesting detail links
//! - Consolidating the harvested links into detail candidates
//! - Fetching detail pages, extracting records and appending them to the sink
//!
//! The coordinator task is the only one that touches the frontier, the filter
//! chains and the visited set. Worker tasks fetch, extract and append; their
//! results come back tagged with their dispatch index so link order follows
//! seed order whatever order the fetches finish in.

use crate::config::{validate, Config, CrawlConfig};
use crate::crawler::fetcher::{build_http_client, FetchOutcome};
use crate::crawler::frontier::{seed_listing_pages, Frontier, FrontierEntry};
use crate::crawler::retry::{fetch_with_retry, RetryPolicy};
use crate::extract::{extract_page, harvest_page, AppPageExtractor, Extractor};
use crate::filter::FilterChain;
use crate::output::{CrawlStats, CsvSink, FailureClass, RecordSink};
use crate::state::{CancelFlag, CrawlPhase, VisitedSet};
use crate::url::{resolve_candidate, PageTemplate};
use crate::HarvestError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Detail candidates produced from the harvested links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consolidation {
    /// Absolute, fragment-free, distinct URLs in discovery order
    pub candidates: Vec<String>,
    /// Hrefs that could not be resolved to an http(s) URL with a host
    pub unresolved: usize,
}

/// Turns raw hrefs into detail candidates
///
/// Each href is resolved against `root` and stripped of its fragment.
/// Unresolvable hrefs are logged and dropped; repeats keep their first
/// position.
pub fn consolidate_links(links: &[String], root: &Url) -> Consolidation {
    let mut seen = HashSet::new();
    let mut consolidation = Consolidation::default();

    for href in links {
        match resolve_candidate(href, root) {
            Ok(url) => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    consolidation.candidates.push(url);
                }
            }
            Err(e) => {
                tracing::warn!("Can't process url '{}' ({})", href, e);
                consolidation.unresolved += 1;
            }
        }
    }

    consolidation
}

/// What a listing worker reports back
#[derive(Debug)]
struct ListingReport {
    links: Vec<String>,
    failure: Option<FailureClass>,
}

/// What a detail worker reports back
#[derive(Debug, Default)]
struct DetailReport {
    fetched: bool,
    extracted: bool,
    written: bool,
    failure: Option<FailureClass>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    crawl: Arc<CrawlConfig>,
    concurrency: usize,
    client: Client,
    retry: RetryPolicy,
    template: PageTemplate,
    listing_filters: FilterChain,
    detail_filters: FilterChain,
    visited: VisitedSet,
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn RecordSink>,
    cancel: CancelFlag,
    phase: CrawlPhase,
    stats: CrawlStats,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration (validated here)
    /// * `extractor` - Link harvest and record extraction strategy
    /// * `sink` - Destination for extracted records
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration, root URL or HTTP client
    pub fn new(
        config: Config,
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let template = PageTemplate::parse(&config.crawl.root)?;
        let listing_filters = FilterChain::listing(&config.crawl)?;
        let detail_filters = FilterChain::detail(&config.crawl)?;
        let client = build_http_client(&config.fetch, &config.user_agent)?;

        tracing::debug!("Listing filters: {:?}", listing_filters);
        tracing::debug!("Detail filters: {:?}", detail_filters);

        Ok(Self {
            concurrency: config.fetch.concurrency,
            retry: RetryPolicy::from(&config.fetch),
            crawl: Arc::new(config.crawl),
            client,
            template,
            listing_filters,
            detail_filters,
            visited: VisitedSet::new(),
            extractor,
            sink,
            cancel: CancelFlag::new(),
            phase: CrawlPhase::Seeding,
            stats: CrawlStats::new(),
        })
    }

    /// Uses an externally owned cancellation flag
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this crawl when set
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// URLs fetched so far
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// The listing pages a run would start with
    pub fn seed(&self) -> Frontier {
        seed_listing_pages(&self.template, self.crawl.depth_limit)
    }

    /// Runs the crawl to completion (or cancellation)
    ///
    /// A coordinator runs once; calling `run` again is an invalid phase
    /// transition.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl finished or was cancelled
    /// * `Err(HarvestError)` - The coordinator had already run
    pub async fn run(&mut self) -> Result<CrawlStats, HarvestError> {
        if self.phase != CrawlPhase::Seeding {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::ListingTraversal,
            });
        }

        let start_time = Instant::now();
        tracing::info!(
            "Starting crawl of {} (depth limit {})",
            self.crawl.root,
            self.crawl.depth_limit
        );

        let frontier = self.seed();
        self.stats.listing_pages_seeded = frontier.len() as u64;
        tracing::info!("Total pages to crawl: {}", frontier.len());

        self.transition(CrawlPhase::ListingTraversal)?;
        let links = self.traverse_listings(frontier).await?;
        self.stats.links_harvested = links.len() as u64;

        if !self.cancelled() {
            self.transition(CrawlPhase::LinkConsolidation)?;
            let consolidation = consolidate_links(&links, self.template.root());
            for _ in 0..consolidation.unresolved {
                self.stats
                    .record_failure(FailureClass::HostResolutionFailure);
            }
            self.stats.candidates = consolidation.candidates.len() as u64;
            tracing::info!(
                "{} links harvested, {} distinct detail candidates",
                links.len(),
                consolidation.candidates.len()
            );

            self.transition(CrawlPhase::DetailTraversal)?;
            self.traverse_details(consolidation.candidates).await?;
        }

        if self.cancelled() {
            tracing::warn!("Crawl cancelled during {}", self.phase);
            self.stats.cancelled = true;
        }
        self.transition(CrawlPhase::Done)?;

        self.stats.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl finished: {} records written in {:?}",
            self.stats.records_written,
            self.stats.elapsed
        );

        Ok(self.stats.clone())
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Phase {} -> {}", self.phase, to);
        self.phase = to;
        self.stats.phase = to;
        Ok(())
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Gates a URL through a filter chain and marks it visited
    ///
    /// Returns false if a filter rejected it or another caller marked it first.
    fn admit(&mut self, url: &str, detail: bool) -> bool {
        let chain = if detail {
            &self.detail_filters
        } else {
            &self.listing_filters
        };

        if let Err(rejection) = chain.check(url, &self.visited) {
            tracing::info!("{}", rejection);
            tracing::debug!(
                "All failing filters for {}: {:?}",
                url,
                chain.rejections(url, &self.visited)
            );
            self.stats.record_rejection(rejection.filter);
            return false;
        }

        if !self.visited.mark(url) {
            self.stats.record_rejection("not_visited");
            return false;
        }
        true
    }

    async fn acquire(
        semaphore: &Arc<Semaphore>,
    ) -> Result<tokio::sync::OwnedSemaphorePermit, HarvestError> {
        Arc::clone(semaphore)
            .acquire_owned()
            .await
            .map_err(|_| HarvestError::WorkerPool)
    }

    /// Fetches every admitted listing page and returns the harvested hrefs in
    /// seed order
    async fn traverse_listings(&mut self, mut frontier: Frontier) -> Result<Vec<String>, HarvestError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: JoinSet<(usize, ListingReport)> = JoinSet::new();
        let mut dispatched = 0;

        while let Some(FrontierEntry { url, depth }) = self.next_entry(&mut frontier) {
            if !self.admit(&url, false) {
                continue;
            }

            let permit = Self::acquire(&semaphore).await?;
            let client = self.client.clone();
            let extractor = Arc::clone(&self.extractor);
            let retry = self.retry;
            let index = dispatched;
            dispatched += 1;

            tracing::info!("Depth {} Fetch {}", depth, url);
            workers.spawn(async move {
                let _permit = permit;
                let outcome = fetch_with_retry(&client, &url, &retry).await;
                outcome.log_skip();

                let harvest = harvest_page(&outcome, extractor.as_ref());
                let failure = outcome.failure_class().or(if harvest.usable {
                    None
                } else {
                    Some(FailureClass::ParseFailure)
                });
                (
                    index,
                    ListingReport {
                        links: harvest.links,
                        failure,
                    },
                )
            });
        }

        let mut reports = join_all(workers).await;
        reports.sort_by_key(|(index, _)| *index);

        let mut links = Vec::new();
        for (_, report) in reports {
            match report.failure {
                Some(class) => self.stats.record_failure(class),
                None => self.stats.listing_pages_fetched += 1,
            }
            links.extend(report.links);
        }

        Ok(links)
    }

    /// Visits up to `detail_cap` candidates and appends their records
    async fn traverse_details(&mut self, candidates: Vec<String>) -> Result<(), HarvestError> {
        tracing::info!("Extracting app info");

        let cap = self.crawl.detail_cap.unwrap_or(usize::MAX);
        let mut queue = candidates.into_iter().take(cap);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: JoinSet<(usize, DetailReport)> = JoinSet::new();
        let mut dispatched = 0;

        loop {
            if self.cancelled() {
                break;
            }
            let Some(url) = queue.next() else {
                break;
            };

            tracing::info!("Validate and extract {}", url);
            if !self.admit(&url, true) {
                continue;
            }

            let permit = Self::acquire(&semaphore).await?;
            let client = self.client.clone();
            let extractor = Arc::clone(&self.extractor);
            let sink = Arc::clone(&self.sink);
            let retry = self.retry;
            let index = dispatched;
            dispatched += 1;

            workers.spawn(async move {
                let _permit = permit;
                let report = visit_detail(&client, &retry, extractor.as_ref(), sink.as_ref(), &url).await;
                (index, report)
            });
        }

        let mut reports = join_all(workers).await;
        reports.sort_by_key(|(index, _)| *index);

        for (_, report) in reports {
            if report.fetched {
                self.stats.detail_pages_fetched += 1;
            }
            if report.extracted {
                self.stats.records_extracted += 1;
            }
            if report.written {
                self.stats.records_written += 1;
            }
            if let Some(class) = report.failure {
                self.stats.record_failure(class);
            }
        }

        Ok(())
    }

    /// Dequeues the next entry unless the crawl has been cancelled
    fn next_entry(&self, frontier: &mut Frontier) -> Option<FrontierEntry> {
        if self.cancelled() {
            tracing::debug!("Cancellation requested, {} pages left unvisited", frontier.len());
            return None;
        }
        frontier.pop()
    }
}

async fn visit_detail(
    client: &Client,
    retry: &RetryPolicy,
    extractor: &dyn Extractor,
    sink: &dyn RecordSink,
    url: &str,
) -> DetailReport {
    let mut report = DetailReport::default();

    let outcome = fetch_with_retry(client, url, retry).await;
    outcome.log_skip();
    report.failure = outcome.failure_class();

    let FetchOutcome::Success(page) = outcome else {
        return report;
    };
    report.fetched = true;

    let record = match extract_page(&page, extractor, url) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("No record extracted from {}: {}", url, e);
            report.failure = Some(if page.is_empty() {
                FailureClass::ParseFailure
            } else {
                FailureClass::ExtractionMismatch
            });
            return report;
        }
    };
    report.extracted = true;

    match sink.append(&record) {
        Ok(()) => {
            tracing::debug!("Appended record for {} to {}", url, sink.describe());
            report.written = true;
        }
        Err(e) => {
            tracing::error!("Failed to write record for {}: {}", url, e);
            report.failure = Some(FailureClass::SinkFailure);
        }
    }

    report
}

async fn join_all<T: 'static>(mut workers: JoinSet<T>) -> Vec<T> {
    let mut results = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::error!("Worker task failed: {}", e),
        }
    }
    results
}

/// Runs a crawl with the default extractor, writing records to the configured
/// CSV file
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::load_config;
/// use listing_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} records written", stats.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlStats> {
    let sink = CsvSink::open(&config.output.csv_path)?;
    let extractor = AppPageExtractor::new()?;
    let mut coordinator = Coordinator::new(config, Arc::new(extractor), Arc::new(sink))?;
    coordinator.run().await
}
