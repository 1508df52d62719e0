//! URL handling module for Listing Harvester
//!
//! This module provides canonicalization (fragment stripping), resolution of
//! harvested hrefs against the crawl root, host extraction and host matching,
//! and page-number substitution for listing URLs.

mod domain;
mod matcher;
mod normalize;
mod pagination;

pub use domain::{extract_host, parse_host};
pub use matcher::host_matches;
pub use normalize::{canonicalize, resolve_candidate};
pub use pagination::{PageTemplate, PAGE_PLACEHOLDER};
