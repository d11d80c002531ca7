//! Binary entry point: load configuration, route logs to a file (the TUI owns
//! the terminal), allocate the library and drive the Ratatui event loop until
//! the user exits.
use std::fs;

use anyhow::{Context, Result};
use library_desk::config::LOG_FILE_NAME;
use library_desk::{run_app, App, AppConfig, Library};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    let _log_guard = init_tracing(&config)?;

    tracing::info!("starting library desk v{}", env!("CARGO_PKG_VERSION"));

    let library = Library::from_config(&config).context("failed to allocate the library")?;
    let mut app = App::new(library);
    let outcome = run_app(&mut app);

    let summary = app.into_library().teardown();
    tracing::info!(
        books = summary.books,
        students = summary.students,
        "library desk closed"
    );
    outcome
}

/// Install a file-backed subscriber. The returned guard flushes buffered
/// lines when dropped, so it has to live until `main` returns.
fn init_tracing(config: &AppConfig) -> Result<WorkerGuard> {
    let directory = config.log_directory();
    fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(&directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("library_desk={}", config.logging.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
