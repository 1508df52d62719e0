use crate::config::HostMatch;
use crate::filter::UrlFilter;
use crate::state::VisitedView;
use crate::url::{host_matches, parse_host};

/// Passes if no confine prefix is set, or the URL starts with it
#[derive(Debug, Clone)]
pub struct PrefixFilter {
    prefix: Option<String>,
}

impl PrefixFilter {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }
}

impl UrlFilter for PrefixFilter {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn accepts(&self, url: &str, _visited: &dyn VisitedView) -> bool {
        self.prefix
            .as_deref()
            .map_or(true, |prefix| url.starts_with(prefix))
    }
}

/// Passes if the URL starts with none of the exclude prefixes
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    prefixes: Vec<String>,
}

impl ExcludeFilter {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }
}

impl UrlFilter for ExcludeFilter {
    fn name(&self) -> &'static str {
        "exclude"
    }

    fn accepts(&self, url: &str, _visited: &dyn VisitedView) -> bool {
        !self.prefixes.iter().any(|p| url.starts_with(p.as_str()))
    }
}

/// Passes if the canonical URL has not been visited in this run
#[derive(Debug, Clone, Copy, Default)]
pub struct NotVisitedFilter;

impl UrlFilter for NotVisitedFilter {
    fn name(&self) -> &'static str {
        "not_visited"
    }

    fn accepts(&self, url: &str, visited: &dyn VisitedView) -> bool {
        !visited.contains(url)
    }
}

/// Passes if the URL's host matches the root host
///
/// A URL whose host cannot be determined is rejected and logged; this filter
/// never reports an error to its caller.
#[derive(Debug, Clone)]
pub struct SameHostFilter {
    root_host: String,
    policy: HostMatch,
}

impl SameHostFilter {
    /// Creates a filter for the given root host (compared lowercase)
    pub fn new(root_host: impl Into<String>, policy: HostMatch) -> Self {
        Self {
            root_host: root_host.into().to_lowercase(),
            policy,
        }
    }

    pub fn root_host(&self) -> &str {
        &self.root_host
    }
}

impl UrlFilter for SameHostFilter {
    fn name(&self) -> &'static str {
        "same_host"
    }

    fn accepts(&self, url: &str, _visited: &dyn VisitedView) -> bool {
        match parse_host(url) {
            Ok(host) => host_matches(self.policy, &self.root_host, &host),
            Err(e) => {
                tracing::warn!("Can't process url '{}' ({})", url, e);
                false
            }
        }
    }
}
