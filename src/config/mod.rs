//! Configuration module for Listing Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, and command-line flags are applied on top of the
//! loaded values by the binary.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawler will seed {} listing pages", config.crawl.depth_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, FetchConfig, HostMatch, OutputConfig, UserAgentConfig,
    DEFAULT_CSV_PATH, DEFAULT_DEPTH_LIMIT, DEFAULT_DETAIL_CAP, DEFAULT_ROOT_URL,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, config_digest, load_config, load_config_with_hash, parse_config,
};
pub use validation::{validate, MAX_DEPTH_LIMIT};
