//! Output module for crawl reports
//!
//! This module handles:
//! - The error record type produced by the crawl
//! - Persisting the error list as CSV (checkpoints and final write)
//! - Rendering the end-of-run terminal summary

mod csv_output;
pub mod summary;
mod traits;

pub use csv_output::{read_report, CsvReportWriter, CSV_HEADERS};
pub use summary::{format_summary, print_summary};
pub use traits::{CrawlSummary, ErrorRecord, OutputError, OutputResult, ReportWriter};
