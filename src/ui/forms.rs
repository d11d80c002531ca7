use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, NewBook, MAX_AUTHORS};

/// Separator between author names in the single-line authors field.
pub(crate) const AUTHOR_SEPARATOR: char = ';';

/// Render a `Name: value` form row, highlighting the active field and
/// showing a placeholder while the value is empty.
fn field_line(field_name: &str, value: &str, is_active: bool, placeholder: &str) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
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
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) authors: String,
    pub(crate) year: String,
    pub(crate) pages: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Authors,
    Year,
    Pages,
}

impl BookField {
    pub(crate) const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Authors,
        BookField::Year,
        BookField::Pages,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Authors => "Authors",
            BookField::Year => "Year",
            BookField::Pages => "Pages",
        }
    }
}

impl BookForm {
    /// Move focus to the next field, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Authors,
            BookField::Authors => BookField::Year,
            BookField::Year => BookField::Pages,
            BookField::Pages => BookField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Pages,
            BookField::Authors => BookField::Title,
            BookField::Year => BookField::Authors,
            BookField::Pages => BookField::Year,
        };
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Authors => self.authors.push(ch),
            BookField::Year => {
                let leading_minus = ch == '-' && self.year.is_empty();
                if !(ch.is_ascii_digit() || leading_minus) {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Pages => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.pages.push(ch);
            }
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.field_mut(self.active).pop();
    }

    fn field(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.title,
            BookField::Authors => &self.authors,
            BookField::Year => &self.year,
            BookField::Pages => &self.pages,
        }
    }

    fn field_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Authors => &mut self.authors,
            BookField::Year => &mut self.year,
            BookField::Pages => &mut self.pages,
        }
    }

    /// Split the authors field into trimmed, non-empty names.
    pub(crate) fn author_names(&self) -> Vec<String> {
        self.authors
            .split(AUTHOR_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validate the inputs and return a book ready for the catalog.
    pub(crate) fn parse_inputs(&self) -> Result<NewBook> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }

        let authors = self.author_names();
        if authors.is_empty() {
            return Err(anyhow!("At least one author is required."));
        }
        if authors.len() > MAX_AUTHORS {
            return Err(anyhow!(
                "Too many authors: {} given, at most {MAX_AUTHORS} allowed.",
                authors.len()
            ));
        }

        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .context("Publication year must be a whole number.")?;

        let pages_raw = self.pages.trim();
        if pages_raw.is_empty() {
            return Err(anyhow!("Page count is required."));
        }
        let pages = pages_raw
            .parse::<u32>()
            .context("Page count must be a non-negative whole number.")?;

        Ok(NewBook {
            title: title.to_string(),
            authors,
            year,
            pages,
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let placeholder = match field {
            BookField::Authors => "<required, separate with ;>",
            _ => "<required>",
        };
        field_line(
            field.label(),
            self.field(field),
            self.active == field,
            placeholder,
        )
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.field(field).chars().count()
    }
}

/// Form state for registering a student.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum StudentField {
    #[default]
    Id,
    Name,
}

impl StudentForm {
    /// Seed the form with a suggested id.
    pub(crate) fn with_id(id: u32) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Swap focus between the id and name fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            StudentField::Id => StudentField::Name,
            StudentField::Name => StudentField::Id,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            StudentField::Id => {
                if ch.is_ascii_digit() {
                    self.id.push(ch);
                    true
                } else {
                    false
                }
            }
            StudentField::Name => {
                if !ch.is_control() {
                    self.name.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            StudentField::Id => {
                self.id.pop();
            }
            StudentField::Name => {
                self.name.pop();
            }
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(u32, String)> {
        let id_raw = self.id.trim();
        if id_raw.is_empty() {
            return Err(anyhow!("Student id is required."));
        }
        let id = id_raw
            .parse::<u32>()
            .context("Student id must be a whole number.")?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Student name is required."));
        }
        Ok((id, name.to_string()))
    }

    pub(crate) fn build_line(&self, field: StudentField) -> Line<'static> {
        let (name, value) = match field {
            StudentField::Id => ("Id", &self.id),
            StudentField::Name => ("Name", &self.name),
        };
        field_line(name, value, self.active == field, "<required>")
    }

    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        match field {
            StudentField::Id => self.id.chars().count(),
            StudentField::Name => self.name.chars().count(),
        }
    }
}

/// Which way a loan form moves a book.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LoanKind {
    Borrow,
    Return,
}

impl LoanKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            LoanKind::Borrow => "Borrow Book",
            LoanKind::Return => "Return Book",
        }
    }
}

/// Form state shared by the borrow and return dialogs.
#[derive(Clone)]
pub(crate) struct LoanForm {
    pub(crate) kind: LoanKind,
    pub(crate) student: String,
    pub(crate) title: String,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LoanField {
    Student,
    Title,
}

impl LoanForm {
    /// Open a loan form, focusing the first field that still needs input.
    pub(crate) fn new(kind: LoanKind, student: Option<&str>, title: Option<&str>) -> Self {
        let student = student.unwrap_or_default().to_string();
        let title = title.unwrap_or_default().to_string();
        let active = if !student.is_empty() && title.is_empty() {
            LoanField::Title
        } else {
            LoanField::Student
        };
        Self {
            kind,
            student,
            title,
            active,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoanField::Student => LoanField::Title,
            LoanField::Title => LoanField::Student,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoanField::Student => self.student.push(ch),
            LoanField::Title => self.title.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoanField::Student => {
                self.student.pop();
            }
            LoanField::Title => {
                self.title.pop();
            }
        }
    }

    /// Return the trimmed `(student, title)` search terms.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let student = self.student.trim();
        if student.is_empty() {
            return Err(anyhow!("Student name is required."));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        Ok((student.to_string(), title.to_string()))
    }

    pub(crate) fn build_line(&self, field: LoanField) -> Line<'static> {
        let (name, value) = match field {
            LoanField::Student => ("Student", &self.student),
            LoanField::Title => ("Title", &self.title),
        };
        field_line(name, value, self.active == field, "<required>")
    }

    pub(crate) fn value_len(&self, field: LoanField) -> usize {
        match field {
            LoanField::Student => self.student.chars().count(),
            LoanField::Title => self.title.chars().count(),
        }
    }
}

/// State for confirming removal of a book from the catalog.
#[derive(Clone)]
pub(crate) struct ConfirmBookRemove {
    pub(crate) title: String,
    pub(crate) authors: String,
    pub(crate) year: i32,
}

impl ConfirmBookRemove {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            authors: book.author_line(),
            year: book.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_book_form() -> BookForm {
        BookForm {
            title: " Good Omens ".into(),
            authors: "Terry Pratchett; Neil Gaiman;".into(),
            year: "1990".into(),
            pages: "288".into(),
            ..BookForm::default()
        }
    }

    #[test]
    fn book_form_parses_authors_and_numbers() {
        let book = filled_book_form().parse_inputs().unwrap();
        assert_eq!(
            book,
            NewBook::new("Good Omens", ["Terry Pratchett", "Neil Gaiman"], 1990, 288)
        );
    }

    #[test]
    fn book_form_rejects_missing_and_excess_authors() {
        let mut form = filled_book_form();
        form.authors = " ; ".into();
        assert!(form.parse_inputs().is_err());

        form.authors = (0..11).map(|i| format!("A{i}")).collect::<Vec<_>>().join(";");
        let err = form.parse_inputs().unwrap_err();
        assert!(err.to_string().contains("Too many authors"));
    }

    #[test]
    fn numeric_fields_filter_keystrokes() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(form.push_char('-'));
        assert!(form.push_char('4'));
        assert!(!form.push_char('-'));
        assert!(!form.push_char('x'));
        assert_eq!(form.year, "-4");

        form.next_field();
        assert_eq!(form.active, BookField::Pages);
        assert!(!form.push_char('-'));
        assert!(form.push_char('9'));
        form.backspace();
        assert!(form.pages.is_empty());
    }

    #[test]
    fn lone_minus_year_is_rejected() {
        let mut form = filled_book_form();
        form.year = "-".into();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn tab_order_wraps_both_ways() {
        let mut form = BookForm::default();
        for _ in BookField::ALL {
            form.next_field();
        }
        assert_eq!(form.active, BookField::Title);
        form.previous_field();
        assert_eq!(form.active, BookField::Pages);
    }

    #[test]
    fn student_form_requires_id_and_name() {
        let mut form = StudentForm::with_id(4);
        assert!(form.parse_inputs().is_err());
        form.toggle_field();
        for ch in "Alice".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.parse_inputs().unwrap(), (4, "Alice".to_string()));

        form.toggle_field();
        assert!(!form.push_char('a'));
    }

    #[test]
    fn loan_form_focuses_missing_field() {
        let form = LoanForm::new(LoanKind::Borrow, Some("Alice"), None);
        assert_eq!(form.active, LoanField::Title);
        let form = LoanForm::new(LoanKind::Return, None, Some("Dune"));
        assert_eq!(form.active, LoanField::Student);
        assert!(form.parse_inputs().is_err());
    }
}
