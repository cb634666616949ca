//! Line-delimited JSON file with skip-on-corruption reads.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LogError, LogResult};

/// Summary of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// Records that parsed and were passed to the visitor.
    pub records: usize,
    /// Non-blank lines that failed to parse and were skipped.
    pub skipped: usize,
}

/// An append-only file of JSON records, one per line.
#[derive(Debug, Clone)]
pub struct JsonlFile {
    path: PathBuf,
}

impl JsonlFile {
    /// Point at a log file. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, source: std::io::Error) -> LogError {
        LogError::Storage {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one record as a single newline-terminated write.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Serialization`] if the record cannot be encoded
    /// and [`LogError::Storage`] if the file cannot be opened or written.
    /// Failed writes are not retried.
    pub fn append<T: Serialize>(&self, record: &T) -> LogResult<()> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| LogError::Serialization(e.to_string()))?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_err(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_err(e))?;
        file.write_all(&line).map_err(|e| self.storage_err(e))?;
        file.flush().map_err(|e| self.storage_err(e))?;
        Ok(())
    }

    /// Visit every record in file order, skipping lines that do not parse.
    ///
    /// A missing file is an empty log. Blank lines are ignored and not
    /// counted as corrupt.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Storage`] if the file exists but cannot be read.
    pub fn scan<T, F>(&self, mut visit: F) -> LogResult<ReadReport>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "log file not found, treating as empty");
                return Ok(ReadReport::default());
            },
            Err(e) => return Err(self.storage_err(e)),
        };

        let mut reader = BufReader::new(file);
        let mut report = ReadReport::default();
        let mut buf = Vec::new();
        let mut line_no: usize = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| self.storage_err(e))?;
            if read == 0 {
                break;
            }
            line_no = line_no.saturating_add(1);

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<T>(line) {
                Ok(record) => {
                    visit(record);
                    report.records = report.records.saturating_add(1);
                },
                Err(e) => {
                    debug!(path = %self.path.display(), line = line_no, error = %e, "skipping malformed record");
                    report.skipped = report.skipped.saturating_add(1);
                },
            }
        }

        if report.skipped > 0 {
            warn!(
                path = %self.path.display(),
                skipped = report.skipped,
                "skipped malformed log records"
            );
        }

        Ok(report)
    }

    /// Read every parseable record into memory.
    ///
    /// # Errors
    ///
    /// See [`JsonlFile::scan`].
    pub fn read_all<T: DeserializeOwned>(&self) -> LogResult<(Vec<T>, ReadReport)> {
        let mut records = Vec::new();
        let report = self.scan(|r| records.push(r))?;
        Ok((records, report))
    }
}
