use crate::{
    Error, ThisError,
    classify::Classifier,
    naming::TableNaming,
    prelude::*,
    registry::{TypeRegistry, strip_option},
};
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, btree_map::Entry},
    fs,
    path::{Path, PathBuf},
};

///
/// ArtifactError
///

#[derive(Debug, ThisError)]
pub enum ArtifactError {
    #[error("cannot read schema artifact '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write schema artifact '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed schema artifact: {0}")]
    Json(#[from] serde_json::Error),
}

///
/// RawEventVariant
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawEventVariant {
    pub name: String,
    pub fields: Vec<RawField>,
}

impl RawEventVariant {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

///
/// RawEventEnum
///
/// Event record as extracted from source, before classification and
/// resolution.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawEventEnum {
    pub name: String,
    pub source_file: String,
    pub rename_rule: Option<RenameRule>,
    pub variants: Vec<RawEventVariant>,
}

impl RawEventEnum {
    #[must_use]
    pub fn new(name: impl Into<String>, variants: Vec<RawEventVariant>) -> Self {
        Self {
            name: name.into(),
            source_file: String::new(),
            rename_rule: None,
            variants,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    #[must_use]
    pub const fn with_rename_rule(mut self, rule: Option<RenameRule>) -> Self {
        self.rename_rule = rule;
        self
    }
}

///
/// Provenance
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Provenance {
    pub parsed_at: DateTime<Utc>,
    pub source_path: String,
}

impl Provenance {
    #[must_use]
    pub fn now(source_path: impl Into<String>) -> Self {
        Self {
            parsed_at: Utc::now(),
            source_path: source_path.into(),
        }
    }
}

///
/// SchemaContext
/// naming and classification rules used while building a schema
///

#[derive(Clone, Copy, Debug)]
pub struct SchemaContext<'a> {
    pub naming: &'a TableNaming,
    pub classifier: Classifier<'a>,
}

///
/// EventSchema
///
/// Every event record with its classified, resolved fields, plus the
/// registry the trees were resolved against. This is the durable artifact
/// shared between a parse run and later generation runs.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventSchema {
    pub parsed_at: DateTime<Utc>,
    pub source_path: String,
    pub events: BTreeMap<String, EventEnum>,
    pub types: TypeRegistry,
}

impl EventSchema {
    ///
    /// build
    ///
    /// Classify and resolve every field of every raw record. Field order
    /// is preserved exactly; a duplicate record name keeps the first one.
    ///
    pub fn build(
        types: TypeRegistry,
        raw_events: impl IntoIterator<Item = RawEventEnum>,
        ctx: SchemaContext<'_>,
        provenance: Provenance,
    ) -> Self {
        let mut events = BTreeMap::new();

        for raw in raw_events {
            match events.entry(raw.name.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(record = %raw.name, source = %raw.source_file, "duplicate event record ignored");
                }
                Entry::Vacant(slot) => {
                    let record = build_record(&types, raw, ctx);
                    tracing::debug!(
                        record = %record.name,
                        table = %record.table_name,
                        variants = record.variants.len(),
                        "event record built"
                    );
                    slot.insert(record);
                }
            }
        }

        tracing::info!(events = events.len(), types = types.len(), "event schema built");

        Self {
            parsed_at: provenance.parsed_at,
            source_path: provenance.source_path,
            events,
            types,
        }
    }

    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventEnum> {
        self.events.get(name)
    }

    #[must_use]
    pub fn table_for(&self, name: &str) -> Option<&str> {
        self.events.get(name).map(|e| e.table_name.as_str())
    }

    #[must_use]
    pub fn variant(&self, record: &str, variant: &str) -> Option<&EventVariant> {
        self.event(record)?.variant(variant)
    }

    #[must_use]
    pub fn stats(&self) -> SchemaStats {
        let mut stats = SchemaStats {
            events: self.events.len(),
            types: self.types.len(),
            ..SchemaStats::default()
        };

        for variant in self.events.values().flat_map(|e| &e.variants) {
            stats.variants += 1;
            for field in &variant.fields {
                stats.fields += 1;
                *stats.by_category.entry(field.category).or_default() += 1;
            }
        }

        stats
    }

    //
    // artifact
    //

    pub fn to_json(&self) -> Result<String, Error> {
        let json = serde_json::to_string_pretty(self).map_err(ArtifactError::from)?;

        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let schema = serde_json::from_str(json).map_err(ArtifactError::from)?;

        Ok(schema)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let json = self.to_json()?;

        fs::write(path, json).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "schema artifact written");

        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&json)
    }
}

// build_record
fn build_record(types: &TypeRegistry, raw: RawEventEnum, ctx: SchemaContext<'_>) -> EventEnum {
    let variants = raw
        .variants
        .into_iter()
        .map(|v| EventVariant {
            fields: v
                .fields
                .iter()
                .map(|f| build_field(types, f, ctx.classifier))
                .collect(),
            name: v.name,
        })
        .collect();

    EventEnum {
        table_name: ctx.naming.table_name(&raw.name),
        name: raw.name,
        variants,
        source_file: raw.source_file,
        rename_rule: raw.rename_rule,
    }
}

// build_field
fn build_field(types: &TypeRegistry, field: &RawField, classifier: Classifier<'_>) -> EventField {
    let (ty, wrapped) = strip_option(&field.ty);

    EventField {
        name: field.name.clone(),
        ty: ty.to_string(),
        category: classifier.classify(&field.name, ty),
        optional: field.optional || wrapped,
        resolved: (*types.resolve(ty)).clone(),
    }
}

///
/// SchemaStats
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SchemaStats {
    pub events: usize,
    pub variants: usize,
    pub fields: usize,
    pub types: usize,
    pub by_category: BTreeMap<Category, usize>,
}

///
/// TESTS
///
