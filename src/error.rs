//! Error type shared by every catalog, roster and lending operation. Each
//! variant describes one way a single operation can be refused; none of them
//! poison the library, so the caller can report the message and keep going.

use thiserror::Error;

/// Shorthand used throughout the core.
pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// Growing a collection could not obtain storage.
    #[error("not enough memory to grow the collection")]
    AllocationFailure,

    /// An argument fell outside the accepted range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no book matches \"{0}\"")]
    BookNotFound(String),

    #[error("no student matches \"{0}\"")]
    StudentNotFound(String),

    #[error("\"{title}\" is already borrowed by {borrower}")]
    AlreadyBorrowed { title: String, borrower: String },

    #[error("{student} already has {limit} book(s), the borrowing limit")]
    LimitReached { student: String, limit: usize },

    #[error("\"{0}\" is not currently borrowed")]
    NotBorrowed(String),

    #[error("\"{title}\" was borrowed by {borrower}, not {student}")]
    WrongBorrower {
        title: String,
        borrower: String,
        student: String,
    },

    /// The book and the student disagree about a loan. This is a bookkeeping
    /// bug, never a user mistake.
    #[error("inconsistent loan records: \"{title}\" is lent to {student} but missing from their list")]
    InconsistentState { title: String, student: String },
}

impl LibraryError {
    /// Whether the error points at a defect in the library itself rather
    /// than at the request that triggered it.
    pub fn is_internal(&self) -> bool {
        matches!(self, LibraryError::InconsistentState { .. })
    }

    /// Whether a lookup failed, regardless of which collection was searched.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::BookNotFound(_) | LibraryError::StudentNotFound(_)
        )
    }

    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        LibraryError::InvalidInput(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_inconsistent_state_is_internal() {
        let bug = LibraryError::InconsistentState {
            title: "Dune".into(),
            student: "Alice".into(),
        };
        assert!(bug.is_internal());
        assert!(!LibraryError::NotBorrowed("Dune".into()).is_internal());
        assert!(!LibraryError::AllocationFailure.is_internal());
    }

    #[test]
    fn both_lookup_failures_count_as_not_found() {
        assert!(LibraryError::BookNotFound("x".into()).is_not_found());
        assert!(LibraryError::StudentNotFound("x".into()).is_not_found());
        assert!(!LibraryError::invalid("x").is_not_found());
    }

    #[test]
    fn messages_name_the_records_involved() {
        let err = LibraryError::LimitReached {
            student: "Alice".into(),
            limit: 3,
        };
        assert_eq!(
            err.to_string(),
            "Alice already has 3 book(s), the borrowing limit"
        );
    }
}
