//! Scenario generation.
//!
//! Walks a timeline in day order and turns each event reference into one
//! [`BatchEntry`]: an emitted record, or a placeholder when the reference
//! cannot be matched against the schema.

mod diagnostic;
mod record;

pub use diagnostic::*;
pub use record::*;

use crate::{
    Error,
    resolve::Substitution,
    scenario::{EventRef, Scenario},
    statement::Batch,
    tracker::{IdTracker, TrackerError},
};
use chrono::{DateTime, SubsecRound, Utc};
use scenariogen_schema::prelude::*;
use serde_json::{Map, Value};

/// Default time of day for temporal auto-fill and `recorded_at`.
const DAY_HOUR: u32 = 0;
const DAY_MINUTE: u32 = 0;

/// Entity types that get a `main` identity when a customer block is set.
pub const DEFAULT_CUSTOMER_ENTITIES: &[&str] = &["customer", "party", "deposit_account"];

///
/// GenerateOptions
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerateOptions {
    pub naming: TableNaming,
    pub customer_entities: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            naming: TableNaming::default(),
            customer_entities: DEFAULT_CUSTOMER_ENTITIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

///
/// Generation
///
/// Output of one run: entries in emission order, plus the tracker that
/// issued their identities.
///

#[derive(Debug)]
pub struct Generation {
    pub scenario_name: String,
    pub base_time: DateTime<Utc>,
    pub seed: u64,
    pub entries: Vec<BatchEntry>,
    pub tracker: IdTracker,
}

impl Generation {
    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter().filter_map(BatchEntry::as_record)
    }

    /// Every diagnostic, placeholders and per-record, in emission order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().flat_map(|entry| match entry {
            BatchEntry::Record(r) => r.diagnostics.iter().collect::<Vec<_>>(),
            BatchEntry::Placeholder(d) => vec![d],
        })
    }

    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        self.diagnostics().next().is_some()
    }

    ///
    /// to_batch
    ///
    /// Statements in emission order. The header is built from the scenario
    /// base time, not the wall clock, so output is reproducible.
    ///
    pub fn to_batch(&self, source: &str) -> Result<Batch, Error> {
        let mut batch = Batch::new();
        batch.header(format!("Generated from: {source}"));
        batch.header(format!("Base time: {}", self.base_time.to_rfc3339()));
        batch.header(format!("Seed: {}", self.seed));
        batch.header(format!("Scenario: {}", self.scenario_name));

        let mut current_day = None;
        for entry in &self.entries {
            if current_day != Some(entry.day()) {
                current_day = Some(entry.day());
                batch.comment(format!("Day {}", entry.day()));
            }

            match entry {
                BatchEntry::Record(record) => {
                    for d in &record.diagnostics {
                        batch.comment(format!("WARNING: {d}"));
                    }
                    batch.push(record.to_statement()?);
                }
                BatchEntry::Placeholder(d) => batch.comment(format!("WARNING: {d}")),
            }
        }

        Ok(batch)
    }
}

///
/// Generator
///

#[derive(Clone, Copy, Debug)]
pub struct Generator<'a> {
    schema: &'a EventSchema,
    options: &'a GenerateOptions,
}

impl<'a> Generator<'a> {
    #[must_use]
    pub const fn new(schema: &'a EventSchema, options: &'a GenerateOptions) -> Self {
        Self { schema, options }
    }

    ///
    /// generate
    ///
    /// Identifiers are seeded from `seed`, or the base time when no seed is
    /// given. A scenario without `base_time` starts at the current second.
    ///
    pub fn generate(&self, scenario: &Scenario) -> Result<Generation, Error> {
        let base_time = scenario
            .base_time()?
            .unwrap_or_else(|| Utc::now().trunc_subsecs(0));
        let seed = scenario
            .seed
            .unwrap_or_else(|| base_time.timestamp_millis().unsigned_abs());
        let mut tracker = IdTracker::new(base_time, seed);

        if scenario.customer.is_some() {
            for entity_type in &self.options.customer_entities {
                tracker.get_or_create(entity_type, Some("main"));
            }
        }

        let substitution = Substitution {
            inputs: &scenario.inputs,
            customer: scenario.customer.as_ref(),
        };

        let mut entries = Vec::new();
        for entry in scenario.ordered_timeline() {
            for event in &entry.events {
                let emitted = self.emit(event, entry.day, &substitution, &mut tracker)?;
                if let BatchEntry::Placeholder(d) = &emitted {
                    tracing::warn!(%d, "event reference skipped");
                }
                entries.push(emitted);
            }
        }

        tracing::info!(
            scenario = scenario.name(),
            entries = entries.len(),
            identities = tracker.len(),
            "scenario generated"
        );

        Ok(Generation {
            scenario_name: scenario.name().to_string(),
            base_time,
            seed,
            entries,
            tracker,
        })
    }

    // emit
    // one event reference -> one batch entry
    fn emit(
        &self,
        event: &EventRef,
        day: u32,
        substitution: &Substitution<'_>,
        tracker: &mut IdTracker,
    ) -> Result<BatchEntry, TrackerError> {
        let recorded_at = tracker.timestamp_for(day, DAY_HOUR, DAY_MINUTE)?;
        let stamp = tracker.timestamp_str(day, DAY_HOUR, DAY_MINUTE)?;

        let unknown = |reason| {
            Ok(BatchEntry::Placeholder(Diagnostic::UnknownReference {
                day,
                reference: event.reference.clone(),
                reason,
            }))
        };

        let Some((record_name, variant_name)) = event.split() else {
            return unknown(UnknownReason::Malformed);
        };
        let Some(record) = self.schema.event(record_name) else {
            return unknown(UnknownReason::UnknownRecord);
        };
        let Some(variant) = record.variant(variant_name) else {
            return unknown(UnknownReason::UnknownVariant);
        };

        let entity_type = self.options.naming.entity_type(&record.name);
        let entity = event.entity.as_deref();
        let mut payload = Map::new();
        let mut diagnostics = Vec::new();

        payload.insert(
            "type".to_string(),
            Value::from(record.discriminant(&variant.name)),
        );

        for key in event.params.keys().filter(|k| variant.field(k).is_none()) {
            tracing::warn!(reference = %event.reference, param = %key, "parameter matches no field");
        }

        for field in &variant.fields {
            let explicit = event.params.get(&field.name).and_then(|raw| {
                let resolved = substitution.resolve(raw, tracker);
                if resolved.is_none() {
                    tracing::warn!(
                        reference = %event.reference,
                        field = %field.name,
                        %raw,
                        "substitution resolved to nothing, using auto-fill"
                    );
                }
                resolved
            });

            let value = explicit.or_else(|| auto_fill(field, &entity_type, entity, &stamp, tracker));

            match value {
                Some(v) => {
                    payload.insert(field.name.clone(), v);
                }
                None if field.optional => {}
                None => diagnostics.push(Diagnostic::MissingRequiredInput {
                    day,
                    reference: event.reference.clone(),
                    field: field.name.clone(),
                }),
            }
        }

        let entity_id = match payload.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => tracker.get_or_create(&entity_type, entity),
        };
        let sequence = tracker.next_sequence(&entity_id);

        for d in &diagnostics {
            tracing::warn!(%d, "record emitted without required input");
        }
        tracing::debug!(reference = %event.reference, %entity_id, sequence, day, "event emitted");

        Ok(BatchEntry::Record(EventRecord {
            day,
            record: record.name.clone(),
            variant: variant.name.clone(),
            table: record.table_name.clone(),
            entity_id,
            sequence,
            payload,
            recorded_at,
            diagnostics,
        }))
    }
}

// auto_fill
// category-driven default for a field without an explicit value
fn auto_fill(
    field: &EventField,
    entity_type: &str,
    entity: Option<&str>,
    stamp: &str,
    tracker: &mut IdTracker,
) -> Option<Value> {
    match field.category {
        Category::Identity => {
            let id = if field.name == "id" {
                tracker.get_or_create(entity_type, entity)
            } else {
                let related = field.name.strip_suffix("_id").unwrap_or(&field.name);
                tracker.get_or_create(related, None)
            };
            Some(Value::from(id))
        }
        Category::Temporal => Some(Value::from(stamp)),
        Category::Amount => Some(Value::from(0)),
        _ => None,
    }
}
