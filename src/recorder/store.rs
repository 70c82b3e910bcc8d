//! Append-only record store for one session
//!
//! Each session owns a CSV file: a header row followed by one
//! `YYYY-MM-DD HH:MM:SS,<value>` row per sample. Rows are flushed as they are
//! appended so a crash mid-session loses at most the row in flight. The store
//! is never rewritten; summarization reads it back in append order.

use crate::error::{PanelError, Result};
use crate::types::{Sample, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header row of every record store
pub const STORE_HEADER: &str = "Timestamp,Sensor Value";

/// An open, append-only session store
pub struct RecordStore {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
}

impl RecordStore {
    /// Create a new store at `path`, writing the header row
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", STORE_HEADER)?;
        writer.flush()?;

        tracing::debug!("Record store created at {}", path.display());

        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Append one sample row and flush it
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        writeln!(
            self.writer,
            "{},{}",
            sample.format_timestamp(),
            sample.value
        )?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows appended so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, sync, and close the store, returning its path
    pub fn finalize(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.path)
    }

    /// Read every sample of a finalized store, in append order
    ///
    /// Rows that fail to parse are skipped with a warning; the store is
    /// written by this crate, so a bad row means external tampering or a
    /// torn final write.
    pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PanelError::EmptySession(format!("{}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);

        let mut samples = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Header row
            if index == 0 && trimmed.starts_with("Timestamp") {
                continue;
            }

            match parse_row(trimmed) {
                Some(sample) => samples.push(sample),
                None => {
                    tracing::warn!(
                        "Skipping unparseable row {} in {}: {:?}",
                        index + 1,
                        path.display(),
                        trimmed
                    );
                }
            }
        }

        Ok(samples)
    }
}

/// Parse one `timestamp,value` row
fn parse_row(row: &str) -> Option<Sample> {
    let (ts, value) = row.split_once(',')?;
    let timestamp = NaiveDateTime::parse_from_str(ts.trim(), TIMESTAMP_FORMAT).ok()?;
    let value = value.trim().parse::<f64>().ok()?;
    Some(Sample::new(timestamp, value))
}
