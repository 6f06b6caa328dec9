//! Terminal summary of a finished crawl
//!
//! This module renders the end-of-run report shown on stdout: the total
//! number of 4xx errors, a per-status histogram and the first few error URLs.

use crate::output::traits::CrawlSummary;
use std::fmt::Write;

/// Number of error URLs listed individually in the summary
pub const LISTED_ERRORS: usize = 10;

/// Renders the summary as text
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Crawl {} after {} URLs ({} pending, {}s)",
        summary.termination,
        summary.processed,
        summary.remaining,
        summary.duration_seconds()
    );

    if summary.errors.is_empty() {
        let _ = writeln!(out, "No 4xx errors found.");
        return out;
    }

    let _ = writeln!(out, "\n===== 4XX ERROR SUMMARY =====");
    let _ = writeln!(out, "Total errors found: {}", summary.error_count());

    for (status, count) in summary.errors_by_status() {
        let _ = writeln!(out, "Errors {}: {}", status, count);
    }

    let _ = writeln!(
        out,
        "\nURLs with errors were saved to: {}",
        summary.output_path.display()
    );
    let _ = writeln!(out, "URLs with errors:");
    for (index, error) in summary.errors.iter().take(LISTED_ERRORS).enumerate() {
        let _ = writeln!(out, "{}. {} - {}", index + 1, error.url, error.status_code);
    }

    if summary.errors.len() > LISTED_ERRORS {
        let _ = writeln!(out, "... and {} more", summary.errors.len() - LISTED_ERRORS);
    }

    out
}

/// Prints the summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", format_summary(summary));
}
