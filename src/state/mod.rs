//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The phase of the two-phase crawl protocol a run is in
//! - `VisitedSet`: Canonical URLs already dequeued in this run
//! - `CancelFlag`: Cooperative cancellation between frontier dequeues

mod cancel;
mod crawl_phase;
mod visited;

// Re-export main types
pub use cancel::CancelFlag;
pub use crawl_phase::CrawlPhase;
pub use visited::{VisitedSet, VisitedView};
