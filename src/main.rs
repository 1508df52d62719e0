//! Listing Harvester main entry point
//!
//! This is the command-line interface for the listing/detail crawler.

use anyhow::{Context, Result};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, validate, Config};
use listing_harvester::crawler::{seed_listing_pages, Coordinator};
use listing_harvester::output::{print_statistics, write_markdown_report, CrawlReport, CsvSink};
use listing_harvester::url::PageTemplate;
use listing_harvester::AppPageExtractor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: a two-phase listing/detail crawler
///
/// Walks the numbered pages of a listing site, collects the detail links on
/// each page, then visits the first detail pages and appends one record per
/// page to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version)]
#[command(about = "A two-phase listing/detail crawler", long_about = None)]
struct Cli {
    /// Root URL of the first listing page (defaults to the appfun.cn software listing)
    #[arg(value_name = "URL")]
    root: Option<String>,

    /// Enable quiet mode
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Maximum number of listing pages to crawl
    #[arg(short = 'd', long = "depth", value_name = "N")]
    depth: Option<u32>,

    /// Only crawl listing URLs starting with this prefix
    #[arg(short = 'c', long = "confine", value_name = "PREFIX")]
    confine: Option<String>,

    /// Skip listing URLs starting with this prefix (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PREFIX")]
    exclude: Vec<String>,

    /// CSV file records are appended to
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of detail pages to visit
    #[arg(long, value_name = "N", conflicts_with = "no_detail_cap")]
    detail_cap: Option<usize>,

    /// Visit every detail candidate
    #[arg(long)]
    no_detail_cap: bool,

    /// Maximum number of fetches in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Follow links to other hosts
    #[arg(long)]
    no_host_lock: bool,

    /// Write a markdown crawl report to this path
    #[arg(long, value_name = "FILE")]
    summary: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.crawl.root = root.clone();
        }
        if let Some(depth) = self.depth {
            config.crawl.depth_limit = depth;
        }
        if let Some(confine) = &self.confine {
            config.crawl.confine_prefix = Some(confine.clone());
        }
        if !self.exclude.is_empty() {
            config.crawl.exclude_prefixes = self.exclude.clone();
        }
        if self.no_host_lock {
            config.crawl.host_lock = false;
        }
        if self.no_detail_cap {
            config.crawl.detail_cap = None;
        } else if let Some(cap) = self.detail_cap {
            config.crawl.detail_cap = Some(cap);
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = concurrency;
        }
        if let Some(output) = &self.output {
            config.output.csv_path = output.clone();
        }
        if let Some(summary) = &self.summary {
            config.output.summary_path = Some(summary.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    cli.apply(&mut config);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            _ => EnvFilter::new("listing_harvester=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<()> {
    let template = PageTemplate::parse(&config.crawl.root)
        .with_context(|| format!("Invalid root URL {}", config.crawl.root))?;
    let frontier = seed_listing_pages(&template, config.crawl.depth_limit);

    println!("=== Listing Harvester Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Root: {}", config.crawl.root);
    println!("  Depth limit: {}", config.crawl.depth_limit);
    println!(
        "  Confine prefix: {}",
        config.crawl.confine_prefix.as_deref().unwrap_or("(none)")
    );
    println!("  Exclude prefixes ({}):", config.crawl.exclude_prefixes.len());
    for prefix in &config.crawl.exclude_prefixes {
        println!("    - {}", prefix);
    }
    println!(
        "  Host lock: {} ({:?})",
        config.crawl.host_lock, config.crawl.host_match
    );
    match config.crawl.detail_cap {
        Some(cap) => println!("  Detail cap: {}", cap),
        None => println!("  Detail cap: unlimited"),
    }

    println!("\nFetch:");
    println!("  Concurrency: {}", config.fetch.concurrency);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Records: {}", config.output.csv_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\nListing pages ({}):", frontier.len());
    for entry in frontier.iter() {
        println!("  [{}] {}", entry.depth, entry.url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: Option<String>) -> Result<()> {
    let sink = CsvSink::open(&config.output.csv_path)
        .with_context(|| format!("Failed to open record store {}", config.output.csv_path))?;
    let extractor = AppPageExtractor::new().context("Failed to build extractor")?;

    let mut coordinator = Coordinator::new(config.clone(), Arc::new(extractor), Arc::new(sink))
        .context("Failed to set up crawl")?;

    let cancel = coordinator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let stats = coordinator.run().await?;
    print_statistics(&stats);

    if let Some(path) = &config.output.summary_path {
        let mut report = CrawlReport::new(&config, stats);
        if let Some(hash) = config_hash {
            report = report.with_config_hash(hash);
        }
        match write_markdown_report(&report, Path::new(path)) {
            Ok(()) => tracing::info!("Crawl report written to {}", path),
            Err(e) => tracing::error!("Failed to write crawl report {}: {}", path, e),
        }
    }

    Ok(())
}
