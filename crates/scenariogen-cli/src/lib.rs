//! `scenariogen` command line.
//!
//! Thin layer over the library crates: resolves paths from the config and
//! flags, renders the markdown reference and the scenario template, and
//! prints summaries. Logs go to stderr; command output goes to stdout.

pub mod cli;
pub mod commands;
pub mod docs;
pub mod template;

pub use commands::run;

use std::path::PathBuf;
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

///
/// Error
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error(transparent)]
    Config(#[from] scenariogen_config::Error),

    #[error(transparent)]
    Core(#[from] scenariogen_core::Error),

    #[error(transparent)]
    Execute(#[from] scenariogen_core::execute::ExecuteError),

    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Scan(#[from] scenariogen_scan::Error),

    #[error(transparent)]
    Scenario(#[from] scenariogen_core::scenario::ScenarioError),

    #[error(transparent)]
    Schema(#[from] scenariogen_schema::Error),

    #[error(transparent)]
    Statement(#[from] scenariogen_core::statement::StatementError),

    #[error("strict mode: {0} diagnostic(s) produced")]
    Strict(usize),
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
