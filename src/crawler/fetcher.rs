//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the identifying user agent string
//! - GET requests with the HTML content-type precondition
//! - Error classification into `FetchOutcome`

use crate::config::{FetchConfig, UserAgentConfig};
use crate::output::FailureClass;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use scraper::Html;
use std::fmt;
use std::time::Duration;

/// Content types treated as HTML
pub const HTML_CONTENT_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

/// Maximum redirect hops followed per request
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Body decoded as UTF-8 (invalid sequences replaced)
    pub body: String,
}

impl FetchedPage {
    /// Parses the body into a document tree
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Returns true if the body has no non-whitespace content
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 404
    NotFound,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// Any other non-2xx status
    HttpStatus,
    /// Request or connect timeout
    Timeout,
    /// Connection could not be established
    Connect,
    /// Response body could not be read
    Body,
    /// Any other transport error (including redirect errors)
    Request,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::ServerError => "server_error",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Body => "body",
            FailureKind::Request => "request",
        }
    }

    fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            FailureKind::NotFound
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            FailureKind::RateLimited
        } else if status.is_server_error() {
            FailureKind::ServerError
        } else {
            FailureKind::HttpStatus
        }
    }

    fn from_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            FailureKind::Timeout
        } else if error.is_connect() {
            FailureKind::Connect
        } else if error.is_body() || error.is_decode() {
            FailureKind::Body
        } else {
            FailureKind::Request
        }
    }
}

/// Details of a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    /// HTTP status, when the server answered
    pub status_code: Option<u16>,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    /// Returns true for failures worth retrying: timeouts and 5xx responses
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout | FailureKind::ServerError)
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.message, self.url)
    }
}

/// Result of a fetch operation
///
/// A fetch never panics and never returns an error; every way it can go wrong
/// is one of these variants.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Success(FetchedPage),

    /// Response was not HTML; the body was not read
    SkippedWrongType { url: String, content_type: String },

    /// Transport error or non-2xx status
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Failure class for statistics, None on success
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::SkippedWrongType { .. } => Some(FailureClass::WrongContentType),
            FetchOutcome::Failed(_) => Some(FailureClass::TransportFailure),
        }
    }

    /// Logs a non-success outcome at warn level
    pub fn log_skip(&self) {
        match self {
            FetchOutcome::Success(_) => {}
            FetchOutcome::SkippedWrongType { url, content_type } => {
                tracing::warn!("Skipping {}, has type {}", url, content_type);
            }
            FetchOutcome::Failed(failure) => {
                tracing::warn!("ERROR: {}", failure);
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `fetch` - Timeouts
/// * `user_agent` - The user agent identification
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::{FetchConfig, UserAgentConfig};
/// use listing_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    fetch: &FetchConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// # Request Flow
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Non-2xx status | `Failed` with the status code |
/// | Content-Type not HTML | `SkippedWrongType`, body not read |
/// | Timeout / connect / body error | `Failed` without a status code |
/// | Otherwise | `Success` with the lossily decoded body |
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Failed(failure_from_error(url, &e)),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchOutcome::Failed(FetchFailure {
            url: url.to_string(),
            status_code: Some(status.as_u16()),
            kind: FailureKind::from_status(status),
            message: format!("HTTP {}", status),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchOutcome::SkippedWrongType {
            url: url.to_string(),
            content_type,
        };
    }

    match response.bytes().await {
        Ok(bytes) => FetchOutcome::Success(FetchedPage {
            url: url.to_string(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }),
        Err(e) => FetchOutcome::Failed(failure_from_error(url, &e)),
    }
}

/// Returns true if the Content-Type essence is an HTML type
pub fn is_html(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_CONTENT_TYPES.contains(&essence.as_str())
}

fn failure_from_error(url: &str, error: &reqwest::Error) -> FetchFailure {
    FetchFailure {
        url: url.to_string(),
        status_code: error.status().map(|s| s.as_u16()),
        kind: FailureKind::from_error(error),
        message: error.to_string(),
    }
}
