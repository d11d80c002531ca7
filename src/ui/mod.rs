//! Terminal front-end. It parses keystrokes into typed requests for the
//! library and renders the results; none of the lending rules live here.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
