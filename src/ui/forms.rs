use std::path::PathBuf;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::{Field, ValidationError};
use crate::models::{BookId, BookRecord};
use crate::report::Report;

/// Tab order of the entry form, matching the original form layout.
const FIELD_ORDER: [Field; 4] = [Field::Title, Field::Author, Field::Isbn, Field::Price];

/// Raw text typed into the "Add Book" form. Values are handed to the catalog
/// untouched; trimming and parsing happen there.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) isbn: String,
    pub(crate) price: String,
    pub(crate) active: Field,
    pub(crate) error: Option<String>,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            isbn: String::new(),
            price: String::new(),
            active: Field::Title,
            error: None,
        }
    }
}

impl BookForm {
    pub(crate) fn focus(&mut self, field: Field) {
        self.active = field;
    }

    pub(crate) fn next_field(&mut self) {
        self.shift_focus(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.shift_focus(FIELD_ORDER.len() - 1);
    }

    fn shift_focus(&mut self, step: usize) {
        let current = FIELD_ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        self.active = FIELD_ORDER[(current + step) % FIELD_ORDER.len()];
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Isbn => &mut self.isbn,
            Field::Price => &mut self.price,
        }
    }

    pub(crate) fn value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Isbn => &self.isbn,
            Field::Price => &self.price,
        }
    }

    /// Append a printable character to the focused field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let active = self.active;
        self.value_mut(active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let active = self.active;
        self.value_mut(active).pop();
    }

    /// Record a rejected submission and move focus to the offending field.
    pub(crate) fn reject(&mut self, err: &ValidationError) {
        let field = match err {
            ValidationError::MissingField { field } => *field,
            ValidationError::InvalidPrice { .. } => Field::Price,
        };
        self.focus(field);
        self.error = Some(validation_message(err).to_string());
    }

    pub(crate) fn build_line(&self, field: Field) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(field_prefix(field)),
            Span::styled(display, style),
        ])
    }

    /// Cursor cell for the focused field when the field rows are drawn into
    /// `area`, one row per field. Measured in display columns, and held
    /// inside `area` when the value runs past its right edge.
    pub(crate) fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let row = FIELD_ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as u16;
        let width = Span::raw(field_prefix(self.active)).width()
            + Span::raw(self.value(self.active)).width();
        let max_x = area.right().saturating_sub(1).max(area.x);
        let x = area
            .x
            .saturating_add(u16::try_from(width).unwrap_or(u16::MAX))
            .min(max_x);
        (x, area.y + row)
    }

    /// Fields in tab order.
    pub(crate) fn fields() -> [Field; 4] {
        FIELD_ORDER
    }
}

pub(crate) fn field_prefix(field: Field) -> &'static str {
    match field {
        Field::Title => "Title: ",
        Field::Author => "Author: ",
        Field::Isbn => "ISBN: ",
        Field::Price => "Price: ",
    }
}

/// Short message shown to the user for a rejected entry.
pub(crate) fn validation_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingField { .. } => "All fields are required.",
        ValidationError::InvalidPrice { .. } => "Invalid price.",
    }
}

/// Pending single-book deletion. Holds the id rather than the row so the
/// confirmation stays correct even if rows move underneath it.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: BookId,
    pub(crate) title: String,
    pub(crate) author: String,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: &BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// Pending "Clear All".
pub(crate) struct ConfirmClear {
    pub(crate) count: usize,
}

/// The report popup shown after generation.
pub(crate) struct ReportView {
    pub(crate) report: Report,
    /// `None` when writing the file failed.
    pub(crate) saved_to: Option<PathBuf>,
    pub(crate) scroll: u16,
}

impl ReportView {
    pub(crate) fn new(report: Report, saved_to: Option<PathBuf>) -> Self {
        Self {
            report,
            saved_to,
            scroll: 0,
        }
    }

    pub(crate) fn scroll_by(&mut self, offset: i32) {
        let max = self.report.text().lines().count().saturating_sub(1) as i32;
        self.scroll = (i32::from(self.scroll) + offset).clamp(0, max) as u16;
    }
}
