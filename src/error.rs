//! Typed failures for catalog and report operations. The UI turns each of
//! these into a footer message; nothing here is fatal.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::BookId;

/// Input fields collected by the book entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Isbn,
    Price,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Isbn => "ISBN",
            Field::Price => "price",
        };
        f.write_str(name)
    }
}

/// Rejected input for [`Catalog::add`](crate::Catalog::add).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field was empty once surrounding whitespace was removed.
    #[error("the {field} field is required")]
    MissingField { field: Field },

    /// The price text is not a non-negative decimal amount.
    #[error("invalid price: {input:?}")]
    InvalidPrice { input: String },
}

/// The requested row does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("no book at position {index} (catalog holds {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("no book with id {0}")]
    UnknownId(BookId),
}

/// Failures while producing or writing the summary report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("no books available")]
    EmptyCatalog,

    #[error("failed to write report to {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
