use tracing::{debug, info};

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, BookStatus, NewBook, MAX_AUTHORS};

use super::matches_ignore_case;
use super::shelf::{GrowthPolicy, Shelf};

/// Title and year of the book that won a newest/oldest comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub title: String,
    pub year: i32,
}

impl BookSummary {
    fn of(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            year: book.year,
        }
    }
}

/// Aggregate figures over a non-empty catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    pub count: usize,
    pub total_authors: usize,
    /// Total pages divided by `count`, truncated.
    pub average_pages: u64,
    pub newest: BookSummary,
    pub oldest: BookSummary,
}

/// Every book the library owns, kept in insertion order.
#[derive(Debug, Clone)]
pub struct Catalog {
    books: Shelf<Book>,
}

impl Catalog {
    pub fn new(capacity: usize, growth: GrowthPolicy) -> LibraryResult<Self> {
        Ok(Self {
            books: Shelf::with_capacity(capacity, growth)?,
        })
    }

    /// Validate and append a book. New books always start out available.
    pub fn add(&mut self, new_book: NewBook) -> LibraryResult<&Book> {
        let NewBook {
            title,
            authors,
            year,
            pages,
        } = new_book;

        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(LibraryError::invalid("book title is required"));
        }
        if authors.is_empty() || authors.len() > MAX_AUTHORS {
            return Err(LibraryError::invalid(format!(
                "a book needs between 1 and {MAX_AUTHORS} authors, got {}",
                authors.len()
            )));
        }
        let authors: Vec<String> = authors.iter().map(|a| a.trim().to_string()).collect();
        if authors.iter().any(String::is_empty) {
            return Err(LibraryError::invalid("author names cannot be blank"));
        }

        let index = self.books.push(Book {
            title,
            authors,
            year,
            pages,
            status: BookStatus::Available,
        })?;
        let book = &self.books.as_slice()[index];
        info!(title = %book.title, count = self.books.len(), "book added");
        Ok(book)
    }

    /// Index of the first book whose title contains `title`, ignoring case.
    pub fn position_by_title(&self, title: &str) -> Option<usize> {
        self.books
            .position(|book| matches_ignore_case(&book.title, title))
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Book> {
        self.position_by_title(title)
            .and_then(|index| self.books.get(index))
    }

    pub fn find_by_title_mut(&mut self, title: &str) -> Option<&mut Book> {
        let index = self.position_by_title(title)?;
        self.books.get_mut(index)
    }

    /// Drop the first book matching `title`. Returns `false` when nothing
    /// matched.
    pub fn remove(&mut self, title: &str) -> bool {
        match self.position_by_title(title) {
            Some(index) => {
                if let Some(book) = self.books.remove(index) {
                    info!(title = %book.title, count = self.books.len(), "book removed");
                }
                true
            }
            None => {
                debug!(query = title, "no book to remove");
                false
            }
        }
    }

    /// Books whose title or any author contains `term`, in catalog order.
    pub fn search(&self, term: &str) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| Self::book_matches(book, term))
            .collect()
    }

    /// Catalog indices of the books [`Catalog::search`] would return.
    pub fn search_indices(&self, term: &str) -> Vec<usize> {
        self.books
            .iter()
            .enumerate()
            .filter(|(_, book)| Self::book_matches(book, term))
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of books [`Catalog::search`] would return.
    pub fn search_all(&self, term: &str) -> usize {
        self.books
            .iter()
            .filter(|book| Self::book_matches(book, term))
            .count()
    }

    fn book_matches(book: &Book, term: &str) -> bool {
        matches_ignore_case(&book.title, term)
            || book
                .authors
                .iter()
                .any(|author| matches_ignore_case(author, term))
    }

    /// Aggregate figures, or `None` for an empty catalog.
    pub fn statistics(&self) -> Option<CatalogStatistics> {
        let mut books = self.books.iter();
        let first = books.next()?;

        let mut total_authors = first.authors.len();
        let mut total_pages = u64::from(first.pages);
        let mut newest = first;
        let mut oldest = first;

        for book in books {
            total_authors += book.authors.len();
            total_pages += u64::from(book.pages);
            // Strict comparisons keep the earliest book on ties.
            if book.year > newest.year {
                newest = book;
            }
            if book.year < oldest.year {
                oldest = book;
            }
        }

        let count = self.books.len();
        Some(CatalogStatistics {
            count,
            total_authors,
            average_pages: total_pages / count as u64,
            newest: BookSummary::of(newest),
            oldest: BookSummary::of(oldest),
        })
    }

    /// Number of books currently on the shelf and available.
    pub fn available_count(&self) -> usize {
        self.books.iter().filter(|book| book.is_available()).count()
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.books.capacity()
    }
}
