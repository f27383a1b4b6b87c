//! Event schema model for scenario generation.
//!
//! Raw declarations go into a [`registry::TypeRegistry`], event records are
//! classified and resolved into an [`schema::EventSchema`], and the schema
//! is persisted as a JSON artifact for later generation runs.

pub mod classify;
pub mod naming;
pub mod node;
pub mod registry;
pub mod schema;
pub mod types;

use crate::schema::ArtifactError;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        classify::{Classifier, ClassifierRules, DEFAULT_RULES},
        naming::TableNaming,
        node::*,
        registry::TypeRegistry,
        schema::{EventSchema, Provenance, RawEventEnum, RawEventVariant, SchemaContext},
        types::*,
    };
    pub use derive_more::Display;
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    ArtifactError(#[from] ArtifactError),
}
