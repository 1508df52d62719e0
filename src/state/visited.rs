use crate::url::canonicalize;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Read-only view of the visited set
///
/// Filter predicates only ever see this trait, so they cannot mark URLs.
pub trait VisitedView {
    /// Returns true if the canonical form of `url` has been visited
    fn contains(&self, url: &str) -> bool;
}

/// Set of canonical URLs already dequeued in this crawl run
///
/// The set only grows. Every lookup and insert canonicalizes its argument, so
/// `page#a` and `page#b` are the same entry. `mark` is a single critical
/// section: of any number of concurrent callers marking the same URL, exactly
/// one gets `true`.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not visited before and is now marked
    /// * `false` - The URL was already marked; the caller must not fetch it
    pub fn mark(&self, url: &str) -> bool {
        self.lock().insert(canonicalize(url))
    }

    /// Number of distinct URLs visited
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave the set half-updated
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VisitedView for VisitedSet {
    fn contains(&self, url: &str) -> bool {
        self.lock().contains(&canonicalize(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mark_once() {
        let visited = VisitedSet::new();
        assert!(visited.is_empty());

        assert!(visited.mark("http://example.com/a"));
        assert!(!visited.mark("http://example.com/a"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_fragment_variants_are_one_entry() {
        let visited = VisitedSet::new();
        assert!(visited.mark("http://example.com/a#top"));
        assert!(!visited.mark("http://example.com/a"));
        assert!(!visited.mark("http://example.com/a#bottom"));
        assert!(visited.contains("http://example.com/a#anything"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_contains_does_not_mark() {
        let visited = VisitedSet::new();
        assert!(!visited.contains("http://example.com/a"));
        assert!(visited.is_empty());
    }

    #[test]
    fn test_concurrent_mark_single_winner() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || visited.mark("http://example.com/race"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }
}
