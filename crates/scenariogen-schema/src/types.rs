use convert_case::{Case, Casing};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Category
///
/// Behavioral class of an event field. Drives auto-fill during generation
/// and grouping in the rendered documentation.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[display("identity")]
    Identity,
    #[display("flow_control")]
    FlowControl,
    #[display("amount")]
    Amount,
    #[display("temporal")]
    Temporal,
    #[display("reference")]
    Reference,
    #[display("config")]
    Config,
    #[display("metadata")]
    Metadata,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Identity,
        Self::FlowControl,
        Self::Amount,
        Self::Temporal,
        Self::Reference,
        Self::Config,
        Self::Metadata,
    ];

    /// Fields a scenario author is expected to think about.
    #[must_use]
    pub const fn is_scenario_input(self) -> bool {
        matches!(
            self,
            Self::FlowControl | Self::Amount | Self::Config | Self::Temporal
        )
    }
}

///
/// TaggingMode
///
/// How an enum's discriminant is encoded once serialized.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
#[serde(rename_all = "snake_case")]
pub enum TaggingMode {
    #[display("adjacent")]
    Adjacent,
    #[default]
    #[display("external")]
    External,
    #[display("internal")]
    Internal,
    #[display("untagged")]
    Untagged,
}

impl TaggingMode {
    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }
}

///
/// RenameRule
///
/// Mirror of the `rename_all` casing rules understood by serde.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum RenameRule {
    #[display("camelCase")]
    #[serde(rename = "camelCase")]
    Camel,
    #[display("kebab-case")]
    #[serde(rename = "kebab-case")]
    Kebab,
    #[display("lowercase")]
    #[serde(rename = "lowercase")]
    Lower,
    #[display("PascalCase")]
    #[serde(rename = "PascalCase")]
    Pascal,
    #[display("SCREAMING-KEBAB-CASE")]
    #[serde(rename = "SCREAMING-KEBAB-CASE")]
    ScreamingKebab,
    #[display("SCREAMING_SNAKE_CASE")]
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    #[display("snake_case")]
    #[serde(rename = "snake_case")]
    Snake,
    #[display("UPPERCASE")]
    #[serde(rename = "UPPERCASE")]
    Upper,
}

impl RenameRule {
    const ALL: [Self; 8] = [
        Self::Camel,
        Self::Kebab,
        Self::Lower,
        Self::Pascal,
        Self::ScreamingKebab,
        Self::ScreamingSnake,
        Self::Snake,
        Self::Upper,
    ];

    /// Parse the literal used inside `#[serde(rename_all = "...")]`.
    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rule| rule.to_string() == value)
    }

    /// Apply the rule to a PascalCase variant name.
    #[must_use]
    pub fn apply(self, variant: &str) -> String {
        match self {
            Self::Camel => variant.to_case(Case::Camel),
            Self::Kebab => variant.to_case(Case::Kebab),
            Self::Lower => variant.to_lowercase(),
            Self::Pascal => variant.to_string(),
            Self::ScreamingKebab => variant.to_case(Case::Kebab).to_uppercase(),
            Self::ScreamingSnake => variant.to_case(Case::UpperSnake),
            Self::Snake => variant.to_case(Case::Snake),
            Self::Upper => variant.to_uppercase(),
        }
    }
}

///
/// ScalarOrigin
///
/// Why a resolved leaf stopped expanding.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarOrigin {
    /// Language primitive (`u64`, `String`, ...).
    #[default]
    #[display("primitive")]
    Primitive,

    /// Well-known external type that is deliberately not decomposed.
    #[display("foreign")]
    Foreign,

    /// Name the registry has never seen.
    #[display("opaque")]
    Opaque,

    /// Back-reference to a type already on the resolution path.
    #[display("cycle")]
    Cycle,
}

impl ScalarOrigin {
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive)
    }
}

///
/// TESTS
///
