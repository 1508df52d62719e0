use crate::config::HostMatch;

/// Checks whether a candidate host is confined to the root host
///
/// Both hosts are expected to be lowercase already.
///
/// | Policy | Matches |
/// |--------|---------|
/// | `Exact` | `candidate == root` |
/// | `Suffix` | the root host itself, or any dot-separated subdomain of it |
/// | `Substring` | any host containing the root host |
///
/// # Examples
///
/// ```
/// use listing_harvester::config::HostMatch;
/// use listing_harvester::url::host_matches;
///
/// assert!(host_matches(HostMatch::Suffix, "example.com", "cdn.example.com"));
/// assert!(!host_matches(HostMatch::Suffix, "example.com", "notexample.com"));
/// assert!(host_matches(HostMatch::Substring, "example.com", "notexample.com"));
/// ```
pub fn host_matches(policy: HostMatch, root: &str, candidate: &str) -> bool {
    if root.is_empty() || candidate.is_empty() {
        return false;
    }

    match policy {
        HostMatch::Exact => candidate == root,
        HostMatch::Suffix => {
            candidate == root
                || candidate
                    .strip_suffix(root)
                    .is_some_and(|head| head.ends_with('.'))
        }
        HostMatch::Substring => candidate.contains(root),
    }
}
