use serde::{Deserialize, Serialize};

///
/// TableNaming
///
/// Derives storage table names and entity types from event record names.
/// `CreditFacilityEvent` -> `core_credit_facility_events` / `credit_facility`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableNaming {
    pub table_prefix: String,
    pub table_suffix: String,
    pub record_suffix: String,
}

impl Default for TableNaming {
    fn default() -> Self {
        Self {
            table_prefix: "core_".to_string(),
            table_suffix: "_events".to_string(),
            record_suffix: "Event".to_string(),
        }
    }
}

impl TableNaming {
    /// Snake-case stem of a record name, with the record suffix removed.
    ///
    /// Every uppercase letter after the first starts a new word, so acronyms
    /// split per letter (`KYCEvent` -> `k_y_c`) and digits stay attached
    /// (`Oauth2Event` -> `oauth2`). Existing tables are named this way.
    #[must_use]
    pub fn entity_type(&self, record: &str) -> String {
        let stem = record.strip_suffix(&self.record_suffix).unwrap_or(record);

        snake_stem(stem)
    }

    #[must_use]
    pub fn table_name(&self, record: &str) -> String {
        format!(
            "{}{}{}",
            self.table_prefix,
            self.entity_type(record),
            self.table_suffix
        )
    }

    /// Whether a declaration name looks like an event record.
    #[must_use]
    pub fn is_record_name(&self, name: &str) -> bool {
        name.len() > self.record_suffix.len() && name.ends_with(&self.record_suffix)
    }
}

// snake_stem
fn snake_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len() + 4);

    for (i, c) in stem.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }

    out
}

///
/// TESTS
///
