//! Domain records held by the catalog and the roster. They stay plain data
//! holders: validation lives in the collections that create them and the
//! lending rules live in the coordinator, so these types only know how to
//! describe themselves.

use std::fmt;

/// Upper bound on the number of authors a single book may list.
pub const MAX_AUTHORS: usize = 10;

/// Borrowing limit handed to new students unless configuration says otherwise.
pub const DEFAULT_BORROW_LIMIT: usize = 3;

/// Lending state of a book. Keeping the borrower inside the `Borrowed`
/// variant means a book can never be unavailable without a borrower, or carry
/// a borrower while available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BookStatus {
    #[default]
    Available,
    /// Holds the name of the student who has the book.
    Borrowed(String),
}

impl BookStatus {
    /// Short label used by listings.
    pub fn label(&self) -> String {
        match self {
            BookStatus::Available => "Available".to_string(),
            BookStatus::Borrowed(by) => format!("Borrowed by {by}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalogued book together with its lending state.
pub struct Book {
    /// Display title, also the lookup key for every title search.
    pub title: String,
    /// Author names in the order they were entered.
    pub authors: Vec<String>,
    /// Publication year. Signed so ancient works are representable.
    pub year: i32,
    pub pages: u32,
    pub status: BookStatus,
}

impl Book {
    pub fn is_available(&self) -> bool {
        matches!(self.status, BookStatus::Available)
    }

    /// Name of the current borrower, if the book is out.
    pub fn borrower(&self) -> Option<&str> {
        match &self.status {
            BookStatus::Available => None,
            BookStatus::Borrowed(by) => Some(by),
        }
    }

    /// Authors joined with commas for single-line views.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

/// Unvalidated input for a new book. The catalog checks it before anything
/// is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub pages: u32,
}

impl NewBook {
    pub fn new<T, A, S>(title: T, authors: A, year: i32, pages: u32) -> Self
    where
        T: Into<String>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            authors: authors.into_iter().map(Into::into).collect(),
            year,
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered borrower.
pub struct Student {
    /// Caller-assigned number. Not required to be unique.
    pub id: u32,
    /// Lookup key for every roster search.
    pub name: String,
    /// Titles currently on loan, oldest first.
    pub borrowed: Vec<String>,
    /// Maximum number of simultaneous loans.
    pub max_books: usize,
}

impl Student {
    /// Number of further loans the student may take.
    pub fn remaining_allowance(&self) -> usize {
        self.max_books.saturating_sub(self.borrowed.len())
    }

    pub fn at_limit(&self) -> bool {
        self.borrowed.len() >= self.max_books
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            title: "Dune".into(),
            authors: vec!["Frank Herbert".into()],
            year: 1965,
            pages: 412,
            status: BookStatus::Available,
        }
    }

    #[test]
    fn borrower_follows_status() {
        let mut book = dune();
        assert!(book.is_available());
        assert_eq!(book.borrower(), None);

        book.status = BookStatus::Borrowed("Alice".into());
        assert!(!book.is_available());
        assert_eq!(book.borrower(), Some("Alice"));
        assert_eq!(book.status.label(), "Borrowed by Alice");
    }

    #[test]
    fn allowance_never_underflows() {
        let student = Student {
            id: 1,
            name: "Alice".into(),
            borrowed: vec!["a".into(), "b".into()],
            max_books: 1,
        };
        assert!(student.at_limit());
        assert_eq!(student.remaining_allowance(), 0);
    }
}
