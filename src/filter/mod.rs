//! Pre-visit URL filters
//!
//! A URL is eligible for fetching only if every predicate in a `FilterChain`
//! accepts it. Predicates are values closed over the immutable crawl
//! configuration; the only crawl state they can see is a read-only view of the
//! visited set.

mod predicates;

pub use predicates::{ExcludeFilter, NotVisitedFilter, PrefixFilter, SameHostFilter};

use crate::config::CrawlConfig;
use crate::state::VisitedView;
use crate::url::parse_host;
use crate::UrlError;
use std::fmt;

/// A single pre-visit predicate
pub trait UrlFilter: Send + Sync {
    /// Stable name reported when this predicate rejects a URL
    fn name(&self) -> &'static str;

    /// Returns true if the URL passes this predicate
    fn accepts(&self, url: &str, visited: &dyn VisitedView) -> bool;
}

/// The first predicate that rejected a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub url: String,
    pub filter: &'static str,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected by filter '{}'", self.url, self.filter)
    }
}

/// Conjunction of URL predicates
///
/// # Example
///
/// ```
/// use listing_harvester::config::CrawlConfig;
/// use listing_harvester::filter::FilterChain;
/// use listing_harvester::state::VisitedSet;
///
/// let mut config = CrawlConfig::default();
/// config.root = "http://example.com/list/page/1".to_string();
/// config.exclude_prefixes = vec!["http://example.com/ads".to_string()];
///
/// let chain = FilterChain::listing(&config).unwrap();
/// let visited = VisitedSet::new();
///
/// assert!(chain.is_eligible("http://example.com/list/page/2", &visited));
/// assert_eq!(
///     chain.check("http://example.com/ads/1", &visited).unwrap_err().filter,
///     "exclude"
/// );
/// ```
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn UrlFilter>>,
}

impl FilterChain {
    /// Creates an empty chain (accepts every URL)
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate to the chain
    pub fn with(mut self, filter: impl UrlFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Builds the chain gating listing pages
    ///
    /// Order: prefix, exclude, not-visited, then same-host when the crawl is
    /// host-locked.
    pub fn listing(config: &CrawlConfig) -> Result<Self, UrlError> {
        let chain = Self::new()
            .with(PrefixFilter::new(config.confine_prefix.clone()))
            .with(ExcludeFilter::new(config.exclude_prefixes.clone()))
            .with(NotVisitedFilter);
        chain.with_host_lock(config)
    }

    /// Builds the chain gating detail pages
    ///
    /// Detail links come from pages already inside the crawl scope, so only the
    /// visited check and host confinement are applied again.
    pub fn detail(config: &CrawlConfig) -> Result<Self, UrlError> {
        Self::new().with(NotVisitedFilter).with_host_lock(config)
    }

    fn with_host_lock(self, config: &CrawlConfig) -> Result<Self, UrlError> {
        if !config.host_lock {
            return Ok(self);
        }
        let root_host = parse_host(&config.root)?;
        Ok(self.with(SameHostFilter::new(root_host, config.host_match)))
    }

    /// Evaluates the chain, stopping at the first failing predicate
    pub fn check(&self, url: &str, visited: &dyn VisitedView) -> Result<(), Rejection> {
        match self.filters.iter().find(|f| !f.accepts(url, visited)) {
            Some(filter) => Err(Rejection {
                url: url.to_string(),
                filter: filter.name(),
            }),
            None => Ok(()),
        }
    }

    /// Returns true if every predicate accepts the URL
    pub fn is_eligible(&self, url: &str, visited: &dyn VisitedView) -> bool {
        self.check(url, visited).is_ok()
    }

    /// Names of every predicate rejecting the URL (no short-circuit)
    pub fn rejections(&self, url: &str, visited: &dyn VisitedView) -> Vec<&'static str> {
        self.filters
            .iter()
            .filter(|f| !f.accepts(url, visited))
            .map(|f| f.name())
            .collect()
    }

    /// Names of the predicates in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}
