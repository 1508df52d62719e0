//! Markdown crawl report
//!
//! Writes a human-readable report of one crawl run: what was crawled, how
//! many records reached the store, and why pages were skipped.

use crate::config::Config;
use crate::output::stats::CrawlStats;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata plus statistics for one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub root: String,
    pub depth_limit: u32,
    pub detail_cap: Option<usize>,
    pub sink: String,
    pub config_hash: Option<String>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub stats: CrawlStats,
}

impl CrawlReport {
    /// Builds a report for a run that has just finished
    pub fn new(config: &Config, stats: CrawlStats) -> Self {
        let finished_at = Local::now();
        let elapsed = chrono::Duration::from_std(stats.elapsed)
            .unwrap_or_else(|_| chrono::Duration::zero());

        Self {
            root: config.crawl.root.clone(),
            depth_limit: config.crawl.depth_limit,
            detail_cap: config.crawl.detail_cap,
            sink: config.output.csv_path.clone(),
            config_hash: None,
            started_at: finished_at - elapsed,
            finished_at,
            stats,
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Status line for the run
    pub fn status(&self) -> &'static str {
        if self.stats.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    }
}

/// Writes the markdown report to `output_path`, replacing any existing file
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Listing Harvester Crawl Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root**: {}\n", report.root));
    md.push_str(&format!("- **Depth Limit**: {}\n", report.depth_limit));
    match report.detail_cap {
        Some(cap) => md.push_str(&format!("- **Detail Cap**: {}\n", cap)),
        None => md.push_str("- **Detail Cap**: unlimited\n"),
    }
    md.push_str(&format!("- **Record Store**: {}\n", report.sink));
    md.push_str(&format!(
        "- **Started**: {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        stats.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status()));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Per-phase counts
    md.push_str("## Crawl Statistics\n\n");
    md.push_str("| Stage | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!(
        "| Listing pages seeded | {} |\n",
        stats.listing_pages_seeded
    ));
    md.push_str(&format!(
        "| Listing pages fetched | {} |\n",
        stats.listing_pages_fetched
    ));
    md.push_str(&format!("| Links harvested | {} |\n", stats.links_harvested));
    md.push_str(&format!("| Detail candidates | {} |\n", stats.candidates));
    md.push_str(&format!(
        "| Detail pages fetched | {} |\n",
        stats.detail_pages_fetched
    ));
    md.push_str(&format!(
        "| Records extracted | {} |\n",
        stats.records_extracted
    ));
    md.push_str(&format!("| Records written | {} |\n\n", stats.records_written));

    if !stats.rejections.is_empty() {
        md.push_str("## Filter Rejections\n\n");
        md.push_str("| Filter | Count |\n");
        md.push_str("|--------|-------|\n");
        for (filter, count) in &stats.rejections {
            md.push_str(&format!("| {} | {} |\n", filter, count));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Skipped Pages\n\n");
        md.push_str("| Failure | Count |\n");
        md.push_str("|---------|-------|\n");
        for (class, count) in &stats.failures {
            md.push_str(&format!("| {} | {} |\n", class, count));
        }
        md.push('\n');
    }

    md
}
