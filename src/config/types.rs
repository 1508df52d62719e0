use serde::Deserialize;

/// Listing page crawled when no root URL is given
pub const DEFAULT_ROOT_URL: &str = "http://www.appfun.cn/soft/applist/cid/9/page/1";

/// Default number of listing pages to walk
pub const DEFAULT_DEPTH_LIMIT: u32 = 30;

/// Default number of detail pages visited after consolidation
pub const DEFAULT_DETAIL_CAP: usize = 5;

/// Default CSV store path
pub const DEFAULT_CSV_PATH: &str = "app_results.csv";

/// Main configuration structure for Listing Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub crawl: CrawlConfig,
    pub fetch: FetchConfig,
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// What to crawl and which URLs are eligible
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// First listing page; its page-number component drives seeding
    pub root: String,

    /// Number of listing pages to seed (0 seeds nothing)
    pub depth_limit: u32,

    /// Only URLs starting with this prefix are eligible
    pub confine_prefix: Option<String>,

    /// URLs starting with any of these prefixes are never visited
    pub exclude_prefixes: Vec<String>,

    /// Restrict the crawl to the root URL's host
    pub host_lock: bool,

    /// How a candidate host is compared with the root host
    pub host_match: HostMatch,

    /// Maximum number of detail pages visited (None visits every candidate)
    pub detail_cap: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT_URL.to_string(),
            depth_limit: DEFAULT_DEPTH_LIMIT,
            confine_prefix: None,
            exclude_prefixes: Vec::new(),
            host_lock: true,
            host_match: HostMatch::default(),
            detail_cap: Some(DEFAULT_DETAIL_CAP),
        }
    }
}

/// Host comparison policy used by host confinement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatch {
    /// Host must equal the root host
    Exact,

    /// Host must equal the root host or be a subdomain of it
    #[default]
    Suffix,

    /// Host must contain the root host anywhere
    Substring,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Maximum number of fetches in flight within a phase
    pub concurrency: usize,

    /// Extra attempts for transient transport failures
    pub max_retries: u32,

    /// Backoff before the first retry, doubled on every further retry (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            concurrency: 4,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the CSV record store
    pub csv_path: String,

    /// Path to the optional markdown crawl report
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_PATH.to_string(),
            summary_path: None,
        }
    }
}
