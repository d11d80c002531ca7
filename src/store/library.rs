use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, NewBook, Student};

use super::catalog::{Catalog, CatalogStatistics};
use super::lending::{self, LendingStatistics, Loan};
use super::roster::Roster;

/// Counts reported when the library is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownSummary {
    pub books: usize,
    pub students: usize,
    pub open_loans: usize,
}

/// The catalog and roster pair, owned by a single caller. Every operation
/// the menu offers goes through here.
#[derive(Debug, Clone)]
pub struct Library {
    catalog: Catalog,
    roster: Roster,
}

impl Library {
    pub fn new(catalog: Catalog, roster: Roster) -> Self {
        Self { catalog, roster }
    }

    /// Allocate both collections with the configured capacities and growth
    /// policies.
    pub fn from_config(config: &AppConfig) -> LibraryResult<Self> {
        let catalog = Catalog::new(config.catalog.initial_capacity, config.catalog.growth)?;
        let roster = Roster::new(
            config.roster.initial_capacity,
            config.roster.growth,
            config.lending.default_limit,
        )?;
        Ok(Self::new(catalog, roster))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn add_book(&mut self, book: NewBook) -> LibraryResult<&Book> {
        self.catalog.add(book)
    }

    pub fn find_book_by_title(&self, title: &str) -> Option<&Book> {
        self.catalog.find_by_title(title)
    }

    /// Remove the first book matching `title`. A book that is out on loan is
    /// refused so no student keeps a title the catalog no longer has.
    pub fn remove_book_by_title(&mut self, title: &str) -> LibraryResult<bool> {
        if let Some(book) = self.catalog.find_by_title(title) {
            if let Some(borrower) = book.borrower() {
                warn!(title = %book.title, borrower, "removal refused: book is on loan");
                return Err(LibraryError::AlreadyBorrowed {
                    title: book.title.clone(),
                    borrower: borrower.to_string(),
                });
            }
        }
        Ok(self.catalog.remove(title))
    }

    pub fn search_books(&self, term: &str) -> Vec<&Book> {
        self.catalog.search(term)
    }

    pub fn catalog_statistics(&self) -> Option<CatalogStatistics> {
        self.catalog.statistics()
    }

    pub fn add_student(&mut self, id: u32, name: &str) -> LibraryResult<&Student> {
        self.roster.add(id, name)
    }

    pub fn find_student_by_name(&self, name: &str) -> Option<&Student> {
        self.roster.find_by_name(name)
    }

    pub fn borrow_book(&mut self, student: &str, title: &str) -> LibraryResult<Loan> {
        lending::borrow(&mut self.catalog, &mut self.roster, student, title)
    }

    pub fn return_book(&mut self, student: &str, title: &str) -> LibraryResult<Loan> {
        lending::give_back(&mut self.catalog, &mut self.roster, student, title)
    }

    pub fn student_borrowed_list(&self, name: &str) -> LibraryResult<&[String]> {
        self.roster.list_borrowed(name)
    }

    pub fn enhanced_statistics(&self) -> LendingStatistics {
        lending::statistics(&self.catalog, &self.roster)
    }

    /// Release every record, reporting what was held.
    pub fn teardown(self) -> TeardownSummary {
        let summary = TeardownSummary {
            books: self.catalog.len(),
            students: self.roster.len(),
            open_loans: self.roster.iter().map(|s| s.borrowed.len()).sum(),
        };
        info!(
            books = summary.books,
            students = summary.students,
            open_loans = summary.open_loans,
            "library released"
        );
        summary
    }
}
