//! Append-only highscore log.

use crate::error::{StorageError, StorageResult};
use chrono::NaiveDateTime;
use pairlight_core::constants::HIGHSCORE_TIME_FORMAT;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One finished session: how long it took and when it completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighscoreRecord {
    pub duration_secs: u64,
    pub completed_at: NaiveDateTime,
}

impl HighscoreRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(duration_secs: u64, completed_at: NaiveDateTime) -> Self {
        Self {
            duration_secs,
            completed_at,
        }
    }

    fn parse(line: &str) -> StorageResult<Self> {
        let (duration, timestamp) = line
            .split_once(';')
            .ok_or_else(|| StorageError::invalid_record(line, "expected 'duration;timestamp'"))?;

        let duration_secs: u64 = duration
            .trim()
            .parse()
            .map_err(|_| StorageError::invalid_record(line, "duration is not an integer"))?;
        let completed_at = NaiveDateTime::parse_from_str(timestamp.trim(), HIGHSCORE_TIME_FORMAT)
            .map_err(|e| StorageError::invalid_record(line, e.to_string()))?;

        Ok(Self {
            duration_secs,
            completed_at,
        })
    }

    fn to_line(&self) -> String {
        format!(
            "{};{}",
            self.duration_secs,
            self.completed_at.format(HIGHSCORE_TIME_FORMAT)
        )
    }
}

/// Handle to the highscore log file.
#[derive(Debug, Clone)]
pub struct HighscoreLog {
    path: PathBuf,
}

impl HighscoreLog {
    /// Create a handle; the file is created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// # Errors
    /// Returns `StorageError::Io` if the file cannot be opened or written.
    pub fn append(&self, record: &HighscoreRecord) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }

    /// Load all records, sorted ascending by duration.
    ///
    /// Malformed lines, duplicate lines, blank lines, and `#` comments are
    /// skipped. A missing file yields an empty list.
    ///
    /// # Errors
    /// Returns `StorageError::Io` only for read failures other than the file
    /// not existing yet.
    pub fn load(&self) -> StorageResult<Vec<HighscoreRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || !seen.insert(line) {
                continue;
            }
            match HighscoreRecord::parse(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping highscore line: {e}"),
            }
        }

        records.sort_by_key(|record| record.duration_secs);
        Ok(records)
    }
}
