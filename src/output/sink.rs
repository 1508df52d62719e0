//! Record sink trait and errors
//!
//! A sink is the append-only tabular store extracted records go to. The column
//! order is fixed by `COLUMNS` and is written once, ahead of the first row.

use crate::output::record::Record;
use thiserror::Error;

/// Errors that can occur while opening or writing a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Existing store '{path}' has columns {found:?}, expected {expected:?}")]
    ColumnMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for extracted records
///
/// Implementations must serialise concurrent appends; a record is either
/// written whole or not at all.
pub trait RecordSink: Send + Sync {
    /// Appends one record
    fn append(&self, record: &Record) -> SinkResult<()>;

    /// Human-readable location of the store, for logging
    fn describe(&self) -> String;
}
