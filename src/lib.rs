//! Core library surface for the Library Desk TUI application.
//!
//! The catalog, roster and lending rules live in [`store`] and never touch the
//! terminal; [`ui`] is one caller of that API and the binary wires the two
//! together with configuration and logging.
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod ui;

/// Settings loaded at startup.
pub use config::AppConfig;

/// Error type returned by every core operation.
pub use error::{LibraryError, LibraryResult};

/// The two record types the collections hold.
pub use models::{Book, BookStatus, NewBook, Student};

/// The owned catalog/roster pair and its reports.
pub use store::{CatalogStatistics, LendingStatistics, Library, Loan};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
