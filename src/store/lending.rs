//! Borrow and return transactions. Each one resolves a student in the roster
//! and a book in the catalog, checks every precondition, and only then
//! touches either record, so a refused request leaves both collections as
//! they were.

use tracing::{error, info, warn};

use crate::error::{LibraryError, LibraryResult};
use crate::models::BookStatus;

use super::catalog::Catalog;
use super::roster::Roster;

/// Outcome of a successful borrow or return, using the canonical names
/// stored in the records rather than the search terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub student: String,
    pub title: String,
    /// Loans the student holds after the transaction.
    pub held: usize,
    pub limit: usize,
}

/// Name and loan count of the busiest student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStudent {
    pub name: String,
    pub borrowed: usize,
}

/// Figures spanning both the catalog and the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct LendingStatistics {
    pub total_borrowed: usize,
    /// Zero when nobody is registered.
    pub average_per_student: f64,
    /// First student with the highest loan count; `None` with an empty roster.
    pub most_active: Option<ActiveStudent>,
    /// Percentage of books on the shelf; `None` with an empty catalog.
    pub availability_ratio: Option<f64>,
}

pub fn borrow(
    catalog: &mut Catalog,
    roster: &mut Roster,
    student_name: &str,
    title: &str,
) -> LibraryResult<Loan> {
    let student = roster
        .find_by_name_mut(student_name)
        .ok_or_else(|| LibraryError::StudentNotFound(student_name.to_string()))?;
    let book = catalog
        .find_by_title_mut(title)
        .ok_or_else(|| LibraryError::BookNotFound(title.to_string()))?;

    if let BookStatus::Borrowed(borrower) = &book.status {
        warn!(title = %book.title, borrower = %borrower, "borrow refused: already out");
        return Err(LibraryError::AlreadyBorrowed {
            title: book.title.clone(),
            borrower: borrower.clone(),
        });
    }
    if student.at_limit() {
        warn!(student = %student.name, limit = student.max_books, "borrow refused: limit reached");
        return Err(LibraryError::LimitReached {
            student: student.name.clone(),
            limit: student.max_books,
        });
    }

    student
        .borrowed
        .try_reserve(1)
        .map_err(|_| LibraryError::AllocationFailure)?;
    book.status = BookStatus::Borrowed(student.name.clone());
    student.borrowed.push(book.title.clone());

    info!(student = %student.name, title = %book.title, "book borrowed");
    Ok(Loan {
        student: student.name.clone(),
        title: book.title.clone(),
        held: student.borrowed.len(),
        limit: student.max_books,
    })
}

/// Hand a borrowed book back. Named `give_back` because `return` is taken.
pub fn give_back(
    catalog: &mut Catalog,
    roster: &mut Roster,
    student_name: &str,
    title: &str,
) -> LibraryResult<Loan> {
    let student = roster
        .find_by_name_mut(student_name)
        .ok_or_else(|| LibraryError::StudentNotFound(student_name.to_string()))?;
    let book = catalog
        .find_by_title_mut(title)
        .ok_or_else(|| LibraryError::BookNotFound(title.to_string()))?;

    let borrower = match &book.status {
        BookStatus::Available => {
            warn!(title = %book.title, "return refused: not borrowed");
            return Err(LibraryError::NotBorrowed(book.title.clone()));
        }
        BookStatus::Borrowed(borrower) => borrower,
    };
    if !borrower.eq_ignore_ascii_case(&student.name) {
        warn!(title = %book.title, borrower = %borrower, student = %student.name, "return refused: wrong borrower");
        return Err(LibraryError::WrongBorrower {
            title: book.title.clone(),
            borrower: borrower.clone(),
            student: student.name.clone(),
        });
    }

    let Some(slot) = student
        .borrowed
        .iter()
        .position(|held| *held == book.title)
    else {
        error!(title = %book.title, student = %student.name, "loan missing from student record");
        return Err(LibraryError::InconsistentState {
            title: book.title.clone(),
            student: student.name.clone(),
        });
    };

    book.status = BookStatus::Available;
    student.borrowed.remove(slot);

    info!(student = %student.name, title = %book.title, "book returned");
    Ok(Loan {
        student: student.name.clone(),
        title: book.title.clone(),
        held: student.borrowed.len(),
        limit: student.max_books,
    })
}

pub fn statistics(catalog: &Catalog, roster: &Roster) -> LendingStatistics {
    let total_borrowed: usize = roster.iter().map(|s| s.borrowed.len()).sum();

    let average_per_student = if roster.is_empty() {
        0.0
    } else {
        total_borrowed as f64 / roster.len() as f64
    };

    let mut most_active: Option<ActiveStudent> = None;
    for student in roster.iter() {
        let busier = most_active
            .as_ref()
            .map_or(true, |best| student.borrowed.len() > best.borrowed);
        if busier {
            most_active = Some(ActiveStudent {
                name: student.name.clone(),
                borrowed: student.borrowed.len(),
            });
        }
    }

    let availability_ratio = if catalog.is_empty() {
        None
    } else {
        Some(catalog.available_count() as f64 / catalog.len() as f64 * 100.0)
    };

    LendingStatistics {
        total_borrowed,
        average_per_student,
        most_active,
        availability_ratio,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::NewBook;
    use crate::store::shelf::GrowthPolicy;

    fn setup() -> (Catalog, Roster) {
        let mut catalog = Catalog::new(2, GrowthPolicy::default()).unwrap();
        catalog
            .add(NewBook::new("1984", ["George Orwell"], 1949, 328))
            .unwrap();
        catalog
            .add(NewBook::new("Dune", ["Frank Herbert"], 1965, 412))
            .unwrap();
        catalog
            .add(NewBook::new("Emma", ["Jane Austen"], 1815, 474))
            .unwrap();
        catalog
            .add(NewBook::new("Ulysses", ["James Joyce"], 1922, 730))
            .unwrap();

        let mut roster = Roster::new(2, GrowthPolicy::default(), 3).unwrap();
        roster.add(1, "Alice").unwrap();
        roster.add(2, "Bob").unwrap();
        (catalog, roster)
    }

    #[test]
    fn borrow_marks_book_and_records_canonical_title() {
        let (mut catalog, mut roster) = setup();
        let loan = borrow(&mut catalog, &mut roster, "alice", "dun").unwrap();
        assert_eq!(
            loan,
            Loan {
                student: "Alice".into(),
                title: "Dune".into(),
                held: 1,
                limit: 3
            }
        );

        let book = catalog.find_by_title("Dune").unwrap();
        assert_eq!(book.borrower(), Some("Alice"));
        assert_eq!(roster.list_borrowed("Alice").unwrap(), &["Dune".to_string()]);
    }

    #[test]
    fn lookups_fail_student_first() {
        let (mut catalog, mut roster) = setup();
        assert_eq!(
            borrow(&mut catalog, &mut roster, "Zed", "Nope"),
            Err(LibraryError::StudentNotFound("Zed".into()))
        );
        assert_eq!(
            borrow(&mut catalog, &mut roster, "Alice", "Nope"),
            Err(LibraryError::BookNotFound("Nope".into()))
        );
    }

    #[test]
    fn borrowed_book_cannot_be_borrowed_again() {
        let (mut catalog, mut roster) = setup();
        borrow(&mut catalog, &mut roster, "Alice", "1984").unwrap();
        assert_eq!(
            borrow(&mut catalog, &mut roster, "Bob", "1984"),
            Err(LibraryError::AlreadyBorrowed {
                title: "1984".into(),
                borrower: "Alice".into()
            })
        );
        assert!(roster.list_borrowed("Bob").unwrap().is_empty());
    }

    #[test]
    fn fourth_borrow_hits_the_limit() {
        let (mut catalog, mut roster) = setup();
        for title in ["1984", "Dune", "Emma"] {
            borrow(&mut catalog, &mut roster, "Alice", title).unwrap();
        }
        assert_eq!(
            borrow(&mut catalog, &mut roster, "Alice", "Ulysses"),
            Err(LibraryError::LimitReached {
                student: "Alice".into(),
                limit: 3
            })
        );
        assert!(catalog.find_by_title("Ulysses").unwrap().is_available());
    }

    #[test]
    fn return_restores_availability_and_compacts_list() {
        let (mut catalog, mut roster) = setup();
        for title in ["1984", "Dune", "Emma"] {
            borrow(&mut catalog, &mut roster, "Alice", title).unwrap();
        }

        let loan = give_back(&mut catalog, &mut roster, "ALICE", "dune").unwrap();
        assert_eq!(loan.held, 2);
        assert!(catalog.find_by_title("Dune").unwrap().is_available());
        assert_eq!(
            roster.list_borrowed("Alice").unwrap(),
            &["1984".to_string(), "Emma".to_string()]
        );
    }

    #[test]
    fn return_checks_state_and_borrower() {
        let (mut catalog, mut roster) = setup();
        assert_eq!(
            give_back(&mut catalog, &mut roster, "Alice", "Emma"),
            Err(LibraryError::NotBorrowed("Emma".into()))
        );

        borrow(&mut catalog, &mut roster, "Alice", "Emma").unwrap();
        assert_eq!(
            give_back(&mut catalog, &mut roster, "Bob", "Emma"),
            Err(LibraryError::WrongBorrower {
                title: "Emma".into(),
                borrower: "Alice".into(),
                student: "Bob".into()
            })
        );
        assert_eq!(catalog.find_by_title("Emma").unwrap().borrower(), Some("Alice"));
    }

    #[test]
    fn disagreeing_records_surface_as_inconsistent_state() {
        let (mut catalog, mut roster) = setup();
        borrow(&mut catalog, &mut roster, "Alice", "Emma").unwrap();
        roster.find_by_name_mut("Alice").unwrap().borrowed.clear();

        let err = give_back(&mut catalog, &mut roster, "Alice", "Emma").unwrap_err();
        assert!(err.is_internal());
        assert_eq!(catalog.find_by_title("Emma").unwrap().borrower(), Some("Alice"));
    }

    #[test]
    fn statistics_across_both_collections() {
        let (mut catalog, mut roster) = setup();
        borrow(&mut catalog, &mut roster, "Bob", "1984").unwrap();
        borrow(&mut catalog, &mut roster, "Bob", "Dune").unwrap();
        borrow(&mut catalog, &mut roster, "Alice", "Emma").unwrap();

        let stats = statistics(&catalog, &roster);
        assert_eq!(stats.total_borrowed, 3);
        assert_eq!(stats.average_per_student, 1.5);
        assert_eq!(
            stats.most_active,
            Some(ActiveStudent {
                name: "Bob".into(),
                borrowed: 2
            })
        );
        assert_eq!(stats.availability_ratio, Some(25.0));
    }

    #[test]
    fn statistics_without_data() {
        let catalog = Catalog::new(1, GrowthPolicy::default()).unwrap();
        let roster = Roster::new(1, GrowthPolicy::default(), 3).unwrap();
        assert_eq!(
            statistics(&catalog, &roster),
            LendingStatistics {
                total_borrowed: 0,
                average_per_student: 0.0,
                most_active: None,
                availability_ratio: None,
            }
        );
    }
}
