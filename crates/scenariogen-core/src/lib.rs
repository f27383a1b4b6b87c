//! Scenario generation for event-sourced PostgreSQL tables.
//!
//! A [`scenario::Scenario`] timeline is matched against an event schema by
//! the [`generate::Generator`], rendered into a [`statement::Batch`], and
//! optionally applied through a [`execute::BatchExecutor`].

pub mod execute;
pub mod generate;
pub mod resolve;
pub mod scenario;
pub mod statement;
pub mod tracker;

use crate::{
    execute::ExecuteError, scenario::ScenarioError, statement::StatementError,
    tracker::TrackerError,
};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        execute::{BatchExecutor, Credential, DryRunExecutor, ExecutionReport, PsqlExecutor},
        generate::{
            BatchEntry, Diagnostic, EventRecord, GenerateOptions, Generation, Generator,
        },
        scenario::Scenario,
        statement::{Batch, Script, Statement},
        tracker::IdTracker,
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error(transparent)]
    ExecuteError(#[from] ExecuteError),

    #[error(transparent)]
    ScenarioError(#[from] ScenarioError),

    #[error(transparent)]
    StatementError(#[from] StatementError),

    #[error(transparent)]
    TrackerError(#[from] TrackerError),
}
