use super::Diagnostic;
use crate::statement::{Statement, StatementError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

///
/// EventRecord
///
/// One emitted event, keyed by `(entity_id, sequence)`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub day: u32,
    pub record: String,
    pub variant: String,
    pub table: String,
    pub entity_id: String,
    pub sequence: u64,
    pub payload: Map<String, Value>,
    pub recorded_at: DateTime<Utc>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EventRecord {
    /// `Record::Variant`
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}::{}", self.record, self.variant)
    }

    pub fn to_statement(&self) -> Result<Statement, StatementError> {
        Statement::insert_event(
            &self.table,
            &self.entity_id,
            self.sequence,
            &self.variant,
            Value::Object(self.payload.clone()),
            self.recorded_at,
        )
    }
}

///
/// BatchEntry
/// one entry per event reference, in timeline order
///

#[derive(Clone, Debug, PartialEq)]
pub enum BatchEntry {
    Record(EventRecord),
    Placeholder(Diagnostic),
}

impl BatchEntry {
    #[must_use]
    pub const fn day(&self) -> u32 {
        match self {
            Self::Record(r) => r.day,
            Self::Placeholder(d) => d.day(),
        }
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&EventRecord> {
        match self {
            Self::Record(r) => Some(r),
            Self::Placeholder(_) => None,
        }
    }
}
