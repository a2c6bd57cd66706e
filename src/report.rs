//! Plain-text summary of the catalog. Generation is a pure function of the
//! records and the date so the output is reproducible; writing it out is a
//! separate step.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::catalog::total_issued_value;
use crate::error::ReportError;
use crate::models::{BookRecord, Price};

/// File name used when no destination is configured.
pub const DEFAULT_REPORT_PATH: &str = "library_report.txt";

const HEADER: &str = "===== Library Book Report =====";
const SEPARATOR: &str = "----------------------------------";
const CLOSING: &str = "Thank you for using the library!";

/// A generated report along with the figures it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
    total_issued: Price,
    book_count: usize,
}

impl Report {
    /// Full report text, exactly as written to disk.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Exact sum of the issued books' prices.
    pub fn total_issued(&self) -> Price {
        self.total_issued
    }

    /// Number of record lines in the report.
    pub fn book_count(&self) -> usize {
        self.book_count
    }
}

/// Build the report for `records` as of `date`. An empty catalog produces no
/// report at all.
pub fn generate(records: &[BookRecord], date: NaiveDate) -> Result<Report, ReportError> {
    if records.is_empty() {
        return Err(ReportError::EmptyCatalog);
    }

    let total_issued = total_issued_value(records);

    let mut lines = vec![
        HEADER.to_string(),
        format!("Date: {}", date.format("%Y-%m-%d")),
        String::new(),
    ];
    lines.extend(records.iter().map(|book| {
        format!(
            "Title: {} | Author: {} | ISBN: {} | Price: {} | Issued: {}",
            book.title,
            book.author,
            book.isbn,
            book.price,
            book.issued_label()
        )
    }));
    lines.push(String::new());
    lines.push(SEPARATOR.to_string());
    lines.push(format!("Total Issued Value: {total_issued}"));
    lines.push(CLOSING.to_string());
    let text = lines.join("\n");

    Ok(Report {
        text,
        total_issued,
        book_count: records.len(),
    })
}

/// Write `text` to `path`, replacing whatever was there.
pub fn save(text: &str, path: &Path) -> Result<(), ReportError> {
    fs::write(path, text).map_err(|source| {
        error!(path = %path.display(), error = %source, "report write failed");
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), bytes = text.len(), "report saved");
    Ok(())
}
