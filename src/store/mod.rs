//! In-memory storage split across logical submodules.

mod catalog;
mod lending;
mod library;
mod roster;
mod shelf;

pub use catalog::{BookSummary, Catalog, CatalogStatistics};
pub use lending::{borrow, give_back, statistics, ActiveStudent, LendingStatistics, Loan};
pub use library::{Library, TeardownSummary};
pub use roster::Roster;
pub use shelf::{GrowthPolicy, Shelf};

/// Case-insensitive containment using ASCII folding only, so the result does
/// not depend on the locale.
pub(crate) fn matches_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::matches_ignore_case;

    #[test]
    fn folding_is_ascii_only() {
        assert!(matches_ignore_case("Harry Potter", "HARRY"));
        assert!(matches_ignore_case("Harry Potter", "y po"));
        assert!(matches_ignore_case("anything", ""));
        assert!(!matches_ignore_case("ÉMILE", "émile"));
    }
}
