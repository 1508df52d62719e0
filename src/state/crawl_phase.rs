/// Crawl phase definitions for the two-phase crawl protocol
///
/// A crawl moves strictly forward through these phases; a cancelled crawl may
/// jump from any phase straight to `Done`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Listing-page URLs are being placed on the frontier
    Seeding,

    /// Listing pages are being fetched and their detail links harvested
    ListingTraversal,

    /// Harvested links are being canonicalized, resolved and deduplicated
    LinkConsolidation,

    /// Detail pages are being fetched and turned into records
    DetailTraversal,

    /// Terminal phase; statistics are final
    Done,
}

impl CrawlPhase {
    /// Returns true if no further work happens in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the phase that normally follows this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Seeding => Some(Self::ListingTraversal),
            Self::ListingTraversal => Some(Self::LinkConsolidation),
            Self::LinkConsolidation => Some(Self::DetailTraversal),
            Self::DetailTraversal => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Checks whether moving from this phase to `to` is allowed
    ///
    /// Allowed moves are the normal successor, and `Done` from any
    /// non-terminal phase (cancellation).
    pub fn can_transition_to(&self, to: CrawlPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Done || self.next() == Some(to)
    }

    /// Short name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::ListingTraversal => "listing_traversal",
            Self::LinkConsolidation => "link_consolidation",
            Self::DetailTraversal => "detail_traversal",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
