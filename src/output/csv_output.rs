//! CSV error report
//!
//! The report is rewritten in full on every checkpoint. Rows are written to a
//! sibling temporary file which then replaces the report, so a crash during a
//! write leaves the previous checkpoint intact.

use crate::output::traits::{ErrorRecord, OutputResult, ReportWriter};
use std::path::{Path, PathBuf};

/// Header row of the error report
pub const CSV_HEADERS: [&str; 3] = ["url", "status_code", "referrer"];

/// Writes error lists to a CSV file
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    path: PathBuf,
}

impl CsvReportWriter {
    /// Creates a writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the report path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ReportWriter for CsvReportWriter {
    fn persist(&self, errors: &[ErrorRecord]) -> OutputResult<()> {
        let temp_path = self.temp_path();

        {
            let mut writer = csv::Writer::from_path(&temp_path)?;
            writer.write_record(CSV_HEADERS)?;
            for error in errors {
                writer.write_record([
                    error.url.as_str(),
                    error.status_code.to_string().as_str(),
                    error.referrer.as_str(),
                ])?;
            }
            writer.flush()?;
        }

        std::fs::rename(&temp_path, &self.path)?;
        tracing::info!("Error report saved to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Reads an error report back into records
///
/// # Returns
///
/// * `Ok(Vec<ErrorRecord>)` - Rows in file order
/// * `Err(OutputError)` - The file is missing or malformed
pub fn read_report(path: &Path) -> OutputResult<Vec<ErrorRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let status_code = row.get(1).unwrap_or_default().parse::<u16>().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid status code in row {:?}", row),
            )
        })?;
        records.push(ErrorRecord::new(
            row.get(0).unwrap_or_default(),
            status_code,
            row.get(2).unwrap_or_default(),
        ));
    }

    Ok(records)
}
