//! Output module: extracted records, record sinks and crawl reporting
//!
//! This module handles:
//! - The fixed twelve-column `Record` and its builder
//! - Appending records to a store (`CsvSink`, `MemorySink`)
//! - Crawl statistics, the stderr summary and the markdown report

mod csv_sink;
mod markdown;
mod memory;
mod record;
mod sink;
pub mod stats;

pub use csv_sink::CsvSink;
pub use markdown::{format_markdown_report, write_markdown_report, CrawlReport};
pub use memory::MemorySink;
pub use record::{Field, Record, RecordBuilder, UnsetField, COLUMNS, FIELD_COUNT};
pub use sink::{RecordSink, SinkError, SinkResult};
pub use stats::{print_statistics, CrawlStats, FailureClass};
