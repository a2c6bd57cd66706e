//! Library desk: record books, issue and return them, and write a plain-text
//! summary report.
//!
//! The catalog and report modules carry no UI dependency, so the terminal
//! front-end in [`ui`] is only one possible presentation layer over them.
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod ui;

pub use catalog::Catalog;
pub use config::{initialize_tracing, Cli};
pub use error::{Field, IndexError, ReportError, ValidationError};
pub use models::{BookId, BookRecord, Price};
pub use report::{generate, save, Report, DEFAULT_REPORT_PATH};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
