//! The in-memory book list behind the table. Every mutation goes through this
//! type so ordering and validation rules hold no matter which front-end is
//! driving it.

use tracing::{debug, warn};

use crate::error::{Field, IndexError, ValidationError};
use crate::models::{BookId, BookRecord, Price};

/// Ordered collection of books. Rows keep insertion order; removing one shifts
/// the later rows up without reordering them.
#[derive(Debug, Default)]
pub struct Catalog {
    books: Vec<BookRecord>,
    next_id: u64,
}

impl Catalog {
    /// Empty catalog; ids start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate raw form text and append a new, not-issued book. Returns the
    /// row index of the new book.
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        price_text: &str,
    ) -> Result<usize, ValidationError> {
        let record = self.validate(title, author, isbn, price_text).map_err(|err| {
            warn!(error = %err, "rejected book entry");
            err
        })?;

        debug!(id = %record.id, title = %record.title, "book added");
        self.books.push(record);
        Ok(self.books.len() - 1)
    }

    fn validate(
        &mut self,
        title: &str,
        author: &str,
        isbn: &str,
        price_text: &str,
    ) -> Result<BookRecord, ValidationError> {
        let title = required(title, Field::Title)?;
        let author = required(author, Field::Author)?;
        let isbn = required(isbn, Field::Isbn)?;
        let price = Price::parse(required(price_text, Field::Price)?)?;

        self.next_id += 1;
        Ok(BookRecord {
            id: BookId(self.next_id),
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            price,
            issued: false,
        })
    }

    /// Flip the issued flag of the book at `index` and return the new state.
    pub fn toggle_issue(&mut self, index: usize) -> Result<bool, IndexError> {
        let len = self.books.len();
        let book = self
            .books
            .get_mut(index)
            .ok_or(IndexError::OutOfRange { index, len })?;
        book.issued = !book.issued;
        debug!(index, id = %book.id, issued = book.issued, "issue state toggled");
        Ok(book.issued)
    }

    /// Remove the book at `index`. Indices past it shift down by one, so any
    /// other index held by the caller must be resolved again.
    pub fn delete(&mut self, index: usize) -> Result<BookRecord, IndexError> {
        if index >= self.books.len() {
            return Err(IndexError::OutOfRange {
                index,
                len: self.books.len(),
            });
        }
        let removed = self.books.remove(index);
        debug!(index, id = %removed.id, "book deleted");
        Ok(removed)
    }

    /// Drop every book. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        debug!(count = self.books.len(), "catalog cleared");
        self.books.clear();
    }

    /// Read-only snapshot in display order.
    pub fn list(&self) -> &[BookRecord] {
        &self.books
    }

    /// Book at row `index`, if any.
    pub fn get(&self, index: usize) -> Option<&BookRecord> {
        self.books.get(index)
    }

    /// Number of books currently listed.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// True when there is nothing to show or report.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Current row of the book with `id`, if it is still in the catalog.
    pub fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    /// Like [`toggle_issue`](Self::toggle_issue), resolving the row from `id`
    /// first.
    pub fn toggle_issue_by_id(&mut self, id: BookId) -> Result<bool, IndexError> {
        let index = self.position(id).ok_or(IndexError::UnknownId(id))?;
        self.toggle_issue(index)
    }

    /// Like [`delete`](Self::delete), resolving the row from `id` first.
    pub fn delete_by_id(&mut self, id: BookId) -> Result<BookRecord, IndexError> {
        let index = self.position(id).ok_or(IndexError::UnknownId(id))?;
        self.delete(index)
    }

    /// Sum of prices over the books currently issued.
    pub fn total_issued_value(&self) -> Price {
        total_issued_value(&self.books)
    }
}

pub(crate) fn total_issued_value(books: &[BookRecord]) -> Price {
    books
        .iter()
        .filter(|book| book.issued)
        .map(|book| book.price)
        .sum()
}

fn required(value: &str, field: Field) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(trimmed)
    }
}
