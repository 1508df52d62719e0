use crate::UrlError;
use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased. Returns None for URLs without a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses a URL string and extracts its host
///
/// # Returns
///
/// * `Ok(String)` - The lowercase host
/// * `Err(UrlError)` - The string is not a URL, or the URL has no host
pub fn parse_host(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    extract_host(&parsed).ok_or(UrlError::MissingHost)
}
