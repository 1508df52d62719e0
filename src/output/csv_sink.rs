use crate::output::record::{Record, COLUMNS};
use crate::output::sink::{RecordSink, SinkError, SinkResult};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Append-only CSV file sink
///
/// Every append opens the file in append mode, writes the header first if the
/// file is empty, writes one row, flushes and closes. Appends are serialised by
/// an internal lock, so rows never interleave.
///
/// # Example
///
/// ```no_run
/// use listing_harvester::output::{CsvSink, RecordSink};
///
/// let sink = CsvSink::open("app_results.csv").unwrap();
/// println!("writing to {}", sink.describe());
/// ```
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSink {
    /// Opens a sink at `path`
    ///
    /// The file itself is created on the first append. If it already exists
    /// with a header, that header must equal `COLUMNS`.
    ///
    /// # Errors
    ///
    /// * `SinkError::ColumnMismatch` - The existing header differs
    /// * `SinkError::Io` / `SinkError::Csv` - The existing file can't be read
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        let path = path.as_ref().to_path_buf();
        check_existing_header(&path)?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&self, record: &Record) -> SinkResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let write_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(COLUMNS)?;
        }
        writer.write_record(record.values())?;
        writer.flush()?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn check_existing_header(path: &Path) -> SinkResult<()> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if size == 0 {
        return Ok(());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let found: Vec<String> = match reader.records().next() {
        Some(row) => row?.iter().map(str::to_string).collect(),
        None => return Ok(()),
    };

    if found.iter().map(String::as_str).eq(COLUMNS.iter().copied()) {
        Ok(())
    } else {
        Err(SinkError::ColumnMismatch {
            path: path.display().to_string(),
            expected: COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::record::{Field, RecordBuilder};
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_record(title: &str) -> Record {
        Field::ALL
            .into_iter()
            .fold(RecordBuilder::new(), |b, f| b.with(f, format!("{} {}", title, f)))
            .build()
            .unwrap()
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_header_written_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        let sink = CsvSink::open(&path).unwrap();
        assert!(!path.exists());

        sink.append(&sample_record("first")).unwrap();
        sink.append(&sample_record("second")).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], COLUMNS.to_vec());
        assert_eq!(rows[1][0], "first Title");
        assert_eq!(rows[2][11], "second Crawl Time");
    }

    #[test]
    fn test_reopen_appends_without_second_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        CsvSink::open(&path)
            .unwrap()
            .append(&sample_record("one"))
            .unwrap();
        CsvSink::open(&path)
            .unwrap()
            .append(&sample_record("two"))
            .unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], "two Title");
    }

    #[test]
    fn test_empty_existing_file_gets_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        fs::File::create(&path).unwrap();

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&sample_record("x")).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[0], COLUMNS.to_vec());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_mismatched_header_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "url,title").unwrap();
        writeln!(file, "http://example.com,Example").unwrap();

        let err = CsvSink::open(&path).unwrap_err();
        match err {
            SinkError::ColumnMismatch { found, .. } => {
                assert_eq!(found, vec!["url".to_string(), "title".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_values_with_commas_and_unicode_are_quoted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");
        let record = Field::ALL
            .into_iter()
            .fold(RecordBuilder::new(), |b, f| b.with(f, "x"))
            .with(Field::Introduction, "好用的应用, with \"quotes\"\nand a newline")
            .build()
            .unwrap();

        let sink = CsvSink::open(&path).unwrap();
        sink.append(&record).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[1][1], "好用的应用, with \"quotes\"\nand a newline");
    }
}
