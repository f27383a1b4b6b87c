use crate::prelude::*;
use std::ops::Not;

///
/// EventField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventField {
    pub name: String,

    /// Declared type with one `Option<..>` layer removed.
    #[serde(rename = "type")]
    pub ty: String,

    pub category: Category,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub optional: bool,

    pub resolved: ResolvedType,
}

///
/// EventVariant
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventVariant {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<EventField>,
}

impl EventVariant {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&EventField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields of one category, in declaration order.
    pub fn fields_in(&self, category: Category) -> impl Iterator<Item = &EventField> {
        self.fields.iter().filter(move |f| f.category == category)
    }

    pub fn scenario_inputs(&self) -> impl Iterator<Item = &EventField> {
        self.fields.iter().filter(|f| f.category.is_scenario_input())
    }
}

///
/// EventEnum
///
/// One event record: the append-only family of variants stored in a
/// single table.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventEnum {
    pub name: String,
    pub table_name: String,
    pub variants: Vec<EventVariant>,

    #[serde(default)]
    pub source_file: String,

    /// `rename_all` of the record itself, applied to payload discriminants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_rule: Option<RenameRule>,
}

impl EventEnum {
    // variant
    // linear scan, records are small
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&EventVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Payload discriminant for a variant name.
    #[must_use]
    pub fn discriminant(&self, variant: &str) -> String {
        self.rename_rule.map_or_else(
            || variant.to_lowercase(),
            |rule| rule.apply(variant),
        )
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.variants.iter().map(|v| v.fields.len()).sum()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, category: Category) -> EventField {
        EventField {
            name: name.to_string(),
            ty: "String".to_string(),
            category,
            optional: false,
            resolved: ResolvedType::scalar("String", ScalarOrigin::Primitive),
        }
    }

    fn record(rename_rule: Option<RenameRule>) -> EventEnum {
        EventEnum {
            name: "DepositEvent".to_string(),
            table_name: "core_deposit_events".to_string(),
            variants: vec![EventVariant {
                name: "Initialized".to_string(),
                fields: vec![
                    field("id", Category::Identity),
                    field("amount", Category::Amount),
                    field("reference", Category::Metadata),
                ],
            }],
            source_file: String::new(),
            rename_rule,
        }
    }

    #[test]
    fn discriminant_defaults_to_lowercase() {
        assert_eq!(record(None).discriminant("StatusUpdated"), "statusupdated");
        assert_eq!(
            record(Some(RenameRule::Snake)).discriminant("StatusUpdated"),
            "status_updated"
        );
    }

    #[test]
    fn variant_lookup_and_category_filters() {
        let record = record(None);
        let variant = record.variant("Initialized").expect("variant exists");

        assert!(record.variant("Missing").is_none());
        assert_eq!(
            variant
                .fields_in(Category::Amount)
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>(),
            vec!["amount"]
        );
        assert_eq!(variant.scenario_inputs().count(), 1);
        assert_eq!(record.field_count(), 3);
    }
}
