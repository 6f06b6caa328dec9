//! Output handler traits and types
//!
//! This module defines the error record produced by the crawl, the summary of
//! a finished run, and the trait through which error lists are persisted.

use crate::state::TerminationReason;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A URL that answered with a client error, and the page that linked to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorRecord {
    /// The normalized URL
    pub url: String,

    /// HTTP status code (400-499)
    pub status_code: u16,

    /// The page that first linked to `url`, or a sentinel
    pub referrer: String,
}

impl ErrorRecord {
    /// Creates a new error record
    pub fn new(url: impl Into<String>, status_code: u16, referrer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code,
            referrer: referrer.into(),
        }
    }
}

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Error records in discovery order
    pub errors: Vec<ErrorRecord>,

    /// Number of URLs processed
    pub processed: u64,

    /// URLs still in the frontier when the run stopped
    pub remaining: usize,

    /// Why the run stopped
    pub termination: TerminationReason,

    /// Where the error report was written
    pub output_path: PathBuf,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Returns the number of error records
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns error counts per status code, sorted by code
    pub fn errors_by_status(&self) -> BTreeMap<u16, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            *counts.entry(error.status_code).or_insert(0) += 1;
        }
        counts
    }

    /// Returns the wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Trait for error report writers
///
/// A writer receives the complete error list on every checkpoint and on
/// shutdown and replaces whatever it persisted before.
pub trait ReportWriter: Send {
    /// Persists `errors`, overwriting the previous report
    fn persist(&self, errors: &[ErrorRecord]) -> OutputResult<()>;

    /// Describes where reports go, for log messages
    fn location(&self) -> PathBuf;
}
