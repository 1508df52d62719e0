use crate::UrlError;
use url::Url;

/// Reduces a URL to its canonical identity by stripping the fragment
///
/// Everything from the first `#` on is removed; nothing else is touched, so two
/// URLs compare equal after canonicalization exactly when they differ only in
/// their fragment. The operation is idempotent.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::canonicalize;
///
/// assert_eq!(canonicalize("http://foo.com/blah.html#baz"), "http://foo.com/blah.html");
/// assert_eq!(canonicalize("http://foo.com/blah.html"), "http://foo.com/blah.html");
/// ```
pub fn canonicalize(url: &str) -> String {
    match url.split_once('#') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}

/// Resolves a candidate href against the crawl root
///
/// Relative hrefs (`/soft/detail/1`, `detail/1`) are joined onto the root URL;
/// absolute hrefs are kept as they are. The result is canonical (no fragment).
///
/// Rejected:
/// - empty and fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:`, `data:` and any other non-HTTP(S) scheme
/// - hrefs that resolve to a URL without a host
///
/// # Arguments
///
/// * `href` - The raw href found on a listing page
/// * `root` - The crawl root the href is relative to
///
/// # Returns
///
/// * `Ok(Url)` - The absolute, canonical URL
/// * `Err(UrlError)` - The href cannot name a fetchable page
pub fn resolve_candidate(href: &str, root: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Parse(format!("No page reference in '{}'", href)));
    }

    let mut url = root
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
