use std::mem;
use std::path::PathBuf;

use chrono::Local;
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::ReportError;
use crate::report;

use super::forms::{BookForm, ConfirmBookDelete, ConfirmClear, ReportView};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the summary bar above the table.
const SUMMARY_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Which overlay, if any, is receiving keys.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
    ConfirmClear(ConfirmClear),
    ViewingReport(ReportView),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front-end state. The catalog is handed in by the caller and only
/// ever mutated through its public operations.
pub struct App {
    catalog: Catalog,
    report_path: PathBuf,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

/// `1 book`, `2 books`, `0 books`.
fn count_label(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

impl App {
    /// Wrap an existing catalog; reports are written to `report_path`.
    pub fn new(catalog: Catalog, report_path: PathBuf) -> Self {
        Self {
            catalog,
            report_path,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Read access for callers that render or report outside the TUI.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Row currently highlighted in the table.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::ConfirmClear(confirm) => self.handle_confirm_clear(code, confirm),
            Mode::ViewingReport(view) => self.handle_report_view(code, view),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.catalog.len().saturating_sub(1),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                self.clear_status();
                return Mode::AddingBook(BookForm::default());
            }
            KeyCode::Char('i') | KeyCode::Char('I') | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(book) = self.catalog.get(self.selected) {
                    let confirm = ConfirmBookDelete::from(book);
                    self.clear_status();
                    return Mode::ConfirmDelete(confirm);
                }
                self.set_status("Select a book to delete.", StatusKind::Error);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.catalog.is_empty() {
                    self.set_status("The catalog is already empty.", StatusKind::Info);
                } else {
                    self.clear_status();
                    return Mode::ConfirmClear(ConfirmClear {
                        count: self.catalog.len(),
                    });
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => return self.generate_report(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                match self
                    .catalog
                    .add(&form.title, &form.author, &form.isbn, &form.price)
                {
                    Ok(index) => {
                        self.selected = index;
                        let title = self
                            .catalog
                            .get(index)
                            .map(|book| book.title.clone())
                            .unwrap_or_default();
                        self.set_status(format!("Added '{title}'."), StatusKind::Info);
                        return Mode::Normal;
                    }
                    Err(err) => {
                        form.reject(&err);
                        self.set_status(err.to_string(), StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingBook(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.catalog.delete_by_id(confirm.id) {
                    Ok(book) => {
                        self.ensure_in_bounds();
                        self.set_status(format!("Deleted '{}'.", book.title), StatusKind::Info);
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode, confirm: ConfirmClear) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Clear cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.catalog.clear();
                self.selected = 0;
                self.set_status("All books cleared.", StatusKind::Info);
                Mode::Normal
            }
            _ => Mode::ConfirmClear(confirm),
        }
    }

    fn handle_report_view(&mut self, code: KeyCode, mut view: ReportView) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return Mode::Normal,
            KeyCode::Up => view.scroll_by(-1),
            KeyCode::Down => view.scroll_by(1),
            KeyCode::PageUp => view.scroll_by(-(PAGE_STEP as i32)),
            KeyCode::PageDown => view.scroll_by(PAGE_STEP as i32),
            KeyCode::Char('o') | KeyCode::Char('O') => match &view.saved_to {
                Some(path) => {
                    if let Err(err) = open_path(path) {
                        warn!(path = %path.display(), error = %err, "could not open report");
                        self.set_status(format!("Failed to open report: {err}"), StatusKind::Error);
                    } else {
                        self.set_status(format!("Opened {}.", path.display()), StatusKind::Info);
                    }
                }
                None => self.set_status("The report was not saved.", StatusKind::Error),
            },
            _ => {}
        }
        Mode::ViewingReport(view)
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.catalog.get(self.selected).map(|book| book.id) else {
            self.set_status("Select a book to issue/return.", StatusKind::Error);
            return;
        };

        match self.catalog.toggle_issue_by_id(id) {
            Ok(issued) => {
                let title = self
                    .catalog
                    .get(self.selected)
                    .map(|book| book.title.clone())
                    .unwrap_or_default();
                let message = if issued {
                    format!("Issued '{title}'.")
                } else {
                    format!("Returned '{title}'.")
                };
                self.set_status(message, StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn generate_report(&mut self) -> Mode {
        let today = Local::now().date_naive();
        let generated = match report::generate(self.catalog.list(), today) {
            Ok(generated) => generated,
            Err(ReportError::EmptyCatalog) => {
                self.set_status("No books available.", StatusKind::Error);
                return Mode::Normal;
            }
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                return Mode::Normal;
            }
        };

        let saved_to = match report::save(generated.text(), &self.report_path) {
            Ok(()) => {
                info!(books = generated.book_count(), total = %generated.total_issued(), "report generated");
                self.set_status(
                    format!("Report saved as {}", self.report_path.display()),
                    StatusKind::Info,
                );
                Some(self.report_path.clone())
            }
            Err(err) => {
                self.set_status(
                    format!("Failed to save report: {}", surface_error(&err)),
                    StatusKind::Error,
                );
                None
            }
        };

        Mode::ViewingReport(ReportView::new(generated, saved_to))
    }

    fn move_selection(&mut self, offset: isize) {
        if self.catalog.is_empty() {
            return;
        }
        let len = self.catalog.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    fn ensure_in_bounds(&mut self) {
        if self.catalog.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.catalog.len() {
            self.selected = self.catalog.len() - 1;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SUMMARY_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_summary(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ConfirmClear(confirm) => self.draw_confirm_clear(frame, area, confirm),
            Mode::ViewingReport(view) => self.draw_report(frame, area, view),
            Mode::Normal => {}
        }
    }

    fn draw_summary(&self, frame: &mut Frame, area: Rect) {
        let issued = self.catalog.list().iter().filter(|book| book.issued).count();
        let summary = Paragraph::new(Line::from(vec![
            Span::styled(
                count_label(self.catalog.len(), "book"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  •  {issued} issued")),
            Span::raw(format!(
                "  •  Issued value {}",
                self.catalog.total_issued_value()
            )),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Public Library Management System"),
        );
        frame.render_widget(summary, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        if self.catalog.is_empty() {
            let message = Paragraph::new("No books yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Books"));
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(["Title", "Author", "ISBN", "Price", "Issued"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.catalog.list().iter().map(|book| {
            let issued_style = if book.issued {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(book.title.clone()),
                Cell::from(book.author.clone()),
                Cell::from(book.isbn.clone()),
                Cell::from(book.price.to_string()),
                Cell::from(book.issued_label()).style(issued_style),
            ])
        });

        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Books"))
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::AddingBook(_) => &[
                ("[Tab]", " Next Field   "),
                ("[Enter]", " Add Book   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) | Mode::ConfirmClear(_) => {
                &[("[y]", " Confirm   "), ("[n/Esc]", " Cancel")]
            }
            Mode::ViewingReport(_) => &[
                ("[↑↓]", " Scroll   "),
                ("[o]", " Open File   "),
                ("[Esc]", " Close"),
            ],
            Mode::Normal => &[
                ("[↑↓]", " Select   "),
                ("[a]", " Add Book   "),
                ("[i]", " Issue/Return   "),
                ("[d]", " Delete   "),
                ("[c]", " Clear All   "),
                ("[r]", " Generate Report   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Book Entry Form")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(BookForm::fields().len() as u16),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        // Field rows are never wrapped so each field keeps its own row and
        // the cursor math stays valid; overlong values are cut at the border.
        let field_lines: Vec<Line> = BookForm::fields()
            .into_iter()
            .map(|field| form.build_line(field))
            .collect();
        frame.render_widget(Paragraph::new(field_lines), chunks[0]);

        let hint = if let Some(error) = &form.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
        } else {
            Line::from(Span::styled(
                "Enter to add • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            ))
        };
        frame.render_widget(Paragraph::new(hint).wrap(Wrap { trim: true }), chunks[2]);

        frame.set_cursor_position(form.cursor_position(chunks[0]));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let lines = vec![
            Line::from(format!("Delete '{}' by {}?", confirm.title, confirm.author)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        self.draw_confirm(frame, area, "Delete Book", lines);
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmClear) {
        let lines = vec![
            Line::from(format!("Remove all {} books from the catalog?", confirm.count)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        self.draw_confirm(frame, area, "Clear All", lines);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_report(&self, frame: &mut Frame, area: Rect, view: &ReportView) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let title = match &view.saved_to {
            Some(path) => format!("Report • saved as {}", path.display()),
            None => "Report • not saved".to_string(),
        };

        let paragraph = Paragraph::new(view.report.text().to_string())
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0));
        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::error::Field;

    fn app_in(dir: &tempfile::TempDir) -> App {
        App::new(Catalog::new(), dir.path().join("library_report.txt"))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn add_book(app: &mut App, fields: [&str; 4]) {
        app.handle_key(KeyCode::Char('a'));
        for (idx, value) in fields.iter().enumerate() {
            if idx > 0 {
                app.handle_key(KeyCode::Tab);
            }
            type_text(app, value);
        }
        app.handle_key(KeyCode::Enter);
    }

    fn status(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn adding_through_the_form_selects_the_new_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);
        add_book(&mut app, ["1984", "Orwell", "ISBN2", "9.50"]);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.catalog().len(), 2);
        assert_eq!(app.selected(), 1);
        assert_eq!(status(&app), "Added '1984'.");
    }

    #[test]
    fn invalid_entry_keeps_the_form_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        add_book(&mut app, ["T", "A", "I", "abc"]);

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some("Invalid price."));
                assert_eq!(form.active, Field::Price);
                assert_eq!(form.title, "T");
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.catalog().is_empty());

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.catalog().is_empty());
    }

    #[test]
    fn issue_and_delete_without_selection_report_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(KeyCode::Char('i'));
        assert_eq!(status(&app), "Select a book to issue/return.");

        app.handle_key(KeyCode::Char('d'));
        assert_eq!(status(&app), "Select a book to delete.");
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn issue_key_toggles_selected_book() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);
        add_book(&mut app, ["1984", "Orwell", "ISBN2", "9.50"]);

        app.handle_key(KeyCode::Home);
        app.handle_key(KeyCode::Char('i'));
        assert!(app.catalog().list()[0].issued);
        assert_eq!(status(&app), "Issued 'Dune'.");

        app.handle_key(KeyCode::Char(' '));
        assert!(!app.catalog().list()[0].issued);
        assert_eq!(status(&app), "Returned 'Dune'.");
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);
        add_book(&mut app, ["1984", "Orwell", "ISBN2", "9.50"]);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.catalog().len(), 2);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('y'));
        assert_eq!(app.catalog().len(), 1);
        assert_eq!(app.catalog().list()[0].title, "Dune");
        assert_eq!(app.selected(), 0);
    }

    #[test]
    fn clear_all_after_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);

        app.handle_key(KeyCode::Char('c'));
        assert!(matches!(app.mode, Mode::ConfirmClear(_)));
        app.handle_key(KeyCode::Enter);

        assert!(app.catalog().is_empty());
        assert_eq!(status(&app), "All books cleared.");
    }

    #[test]
    fn report_key_writes_file_and_opens_popup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);
        app.handle_key(KeyCode::Char('i'));

        app.handle_key(KeyCode::Char('r'));

        let written = fs::read_to_string(dir.path().join("library_report.txt")).unwrap();
        assert!(written.contains("Total Issued Value: $15.00"));
        match &app.mode {
            Mode::ViewingReport(view) => {
                assert_eq!(view.report.text(), written);
                assert!(view.saved_to.is_some());
            }
            _ => panic!("report popup should be open"),
        }

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn report_on_empty_catalog_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(KeyCode::Char('r'));

        assert_eq!(status(&app), "No books available.");
        assert!(matches!(app.mode, Mode::Normal));
        assert!(!dir.path().join("library_report.txt").exists());
    }

    #[test]
    fn unwritable_report_is_still_shown() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Catalog::new(), dir.path().join("missing").join("out.txt"));
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);

        app.handle_key(KeyCode::Char('r'));

        assert!(status(&app).starts_with("Failed to save report"));
        match &app.mode {
            Mode::ViewingReport(view) => assert!(view.saved_to.is_none()),
            _ => panic!("report popup should be open"),
        }
    }

    #[test]
    fn quit_keys_exit_from_normal_mode_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.handle_key(KeyCode::Char('a'));
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn renders_books_into_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("$15.00"));
        assert!(rendered.contains("1 book  •"));
        assert!(!rendered.contains("1 books"));
    }

    fn render_rows(app: &App, width: u16, height: u16) -> (Vec<String>, Position) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        let buffer = terminal.backend().buffer();
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect();
        (rows, cursor)
    }

    /// Column of the first cell of `needle` in a row of single-width cells.
    fn column_of(row: &str, needle: &str) -> u16 {
        let byte = row.find(needle).unwrap();
        row[..byte].chars().count() as u16
    }

    #[test]
    fn summary_pluralizes_book_count() {
        assert_eq!(count_label(0, "book"), "0 books");
        assert_eq!(count_label(1, "book"), "1 book");
        assert_eq!(count_label(2, "book"), "2 books");

        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, ["Dune", "Frank Herbert", "ISBN1", "15.00"]);
        add_book(&mut app, ["1984", "Orwell", "ISBN2", "9.50"]);
        let (rows, _) = render_rows(&app, 100, 20);
        assert!(rows.iter().any(|row| row.contains("2 books  •")));
    }

    #[test]
    fn long_title_does_not_push_later_form_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.handle_key(KeyCode::Char('a'));
        type_text(&mut app, &"Very long title ".repeat(10));

        let (rows, cursor) = render_rows(&app, 100, 30);

        let title_row = rows.iter().position(|row| row.contains("Title: Very")).unwrap();
        assert!(rows[title_row + 1].contains("Author: "));
        assert_eq!(
            column_of(&rows[title_row + 1], "Author: "),
            column_of(&rows[title_row], "Title: ")
        );
        assert_eq!(cursor.y as usize, title_row);
        let cells: Vec<char> = rows[title_row].chars().collect();
        assert_ne!(cells[cursor.x as usize], '│');
        assert_eq!(cells[cursor.x as usize + 1], '│');
    }

    #[test]
    fn cursor_follows_display_width_of_wide_characters() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.handle_key(KeyCode::Char('a'));
        app.handle_key(KeyCode::Tab);
        type_text(&mut app, "村上");

        let (rows, cursor) = render_rows(&app, 100, 30);

        let author_row = rows.iter().position(|row| row.contains("Author: ")).unwrap();
        assert_eq!(cursor.y as usize, author_row);
        let label_col = column_of(&rows[author_row], "Author: ");
        assert_eq!(cursor.x, label_col + "Author: ".len() as u16 + 4);
    }
}
