//! Listing-page frontier
//!
//! The frontier is filled once, before any fetch, with one entry per listing
//! page. Pages are never enqueued while the crawl runs.

use crate::url::{canonicalize, PageTemplate};
use std::collections::VecDeque;

/// A URL waiting to be fetched, with the depth it was enqueued at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// FIFO work queue bounded by a depth limit
#[derive(Debug)]
pub struct Frontier {
    entries: VecDeque<FrontierEntry>,
    depth_limit: u32,
}

impl Frontier {
    pub fn new(depth_limit: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            depth_limit,
        }
    }

    /// Enqueues an entry (URL canonicalized)
    ///
    /// Returns false, leaving the queue unchanged, if the entry's depth is
    /// above the depth limit.
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        if depth > self.depth_limit {
            tracing::debug!(
                "Refusing {} at depth {} (limit {})",
                url,
                depth,
                self.depth_limit
            );
            return false;
        }
        self.entries.push_back(FrontierEntry {
            url: canonicalize(url),
            depth,
        });
        true
    }

    /// Dequeues the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    /// Entries in dequeue order
    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.entries.iter()
    }
}

/// Seeds the frontier with listing pages 1..=depth_limit
///
/// Page N is enqueued at depth N. A root without a page component yields only
/// itself at depth 1.
pub fn seed_listing_pages(template: &PageTemplate, depth_limit: u32) -> Frontier {
    let mut frontier = Frontier::new(depth_limit);

    if depth_limit > 1 && !template.is_paginated() {
        tracing::warn!(
            "No page number found in {}, only the root page will be crawled",
            template.root()
        );
    }

    for depth in 1..=depth_limit {
        match template.page_url(depth) {
            Some(url) => {
                frontier.push(&url, depth);
            }
            None => break,
        }
    }

    frontier
}
