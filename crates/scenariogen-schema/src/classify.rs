//! Field classification.
//!
//! A classifier maps `(field name, declared type)` to a [`Category`]. The
//! rules are plain data: an ordered type-pattern table, then an ordered
//! name-rule table, then a default. The first match wins.

use crate::prelude::*;

///
/// TypePattern
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypePattern {
    Exact(&'static str),
    Prefix(&'static str),
    Suffix(&'static str),

    /// Matches `open..close` with a non-empty body, e.g. `DateTime<Utc>`.
    Wrapped {
        open: &'static str,
        close: &'static str,
    },
}

impl TypePattern {
    #[must_use]
    pub fn matches(&self, ty: &str) -> bool {
        match *self {
            Self::Exact(s) => ty == s,
            Self::Prefix(s) => ty.starts_with(s),
            Self::Suffix(s) => ty.ends_with(s),
            Self::Wrapped { open, close } => ty
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
                .is_some_and(|body| !body.is_empty()),
        }
    }
}

///
/// NamePattern
/// matched against the lowercased field name
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NamePattern {
    Exact(&'static str),
    Suffix(&'static str),
    Contains(&'static str),
}

impl NamePattern {
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match *self {
            Self::Exact(s) => name == s,
            Self::Suffix(s) => name.ends_with(s),
            Self::Contains(s) => name.contains(s),
        }
    }
}

///
/// TypeRule
///

#[derive(Clone, Copy, Debug)]
pub struct TypeRule {
    pub category: Category,
    pub patterns: &'static [TypePattern],
}

///
/// NameRule
///

#[derive(Clone, Copy, Debug)]
pub struct NameRule {
    pub category: Category,
    pub patterns: &'static [NamePattern],
}

///
/// ClassifierRules
///
/// Immutable rule table. Type rules are checked before name rules; within
/// each table, rules and their patterns are checked in order.
///

#[derive(Clone, Copy, Debug)]
pub struct ClassifierRules {
    pub type_rules: &'static [TypeRule],
    pub name_rules: &'static [NameRule],
    pub fallback: Category,
}

use NamePattern as N;
use TypePattern as T;

pub static DEFAULT_RULES: ClassifierRules = ClassifierRules {
    type_rules: &[
        TypeRule {
            category: Category::Identity,
            patterns: &[
                T::Suffix("Id"),
                T::Exact("Uuid"),
                T::Exact("CalaAccountId"),
                T::Exact("LedgerTxId"),
                T::Exact("CalaTransactionId"),
                T::Exact("CalaAccountSetId"),
                T::Exact("PublicId"),
            ],
        },
        TypeRule {
            category: Category::FlowControl,
            patterns: &[
                T::Suffix("Status"),
                T::Suffix("State"),
                T::Exact("bool"),
                T::Exact("approved"),
                T::Suffix("Type"),
                T::Suffix("Direction"),
                T::Suffix("Level"),
            ],
        },
        TypeRule {
            category: Category::Amount,
            patterns: &[
                T::Exact("UsdCents"),
                T::Exact("Satoshis"),
                T::Exact("Decimal"),
                T::Suffix("Rate"),
                T::Suffix("Ratio"),
                T::Exact("PriceOfOneBTC"),
                T::Suffix("Amount"),
                T::Suffix("Pct"),
            ],
        },
        TypeRule {
            category: Category::Temporal,
            patterns: &[
                T::Wrapped {
                    open: "DateTime<",
                    close: ">",
                },
                T::Exact("NaiveDate"),
                T::Prefix("chrono::"),
                T::Suffix("Date"),
                T::Suffix("At"),
                T::Suffix("Period"),
                T::Exact("EffectiveDate"),
            ],
        },
        TypeRule {
            category: Category::Config,
            patterns: &[
                T::Exact("TermValues"),
                T::Exact("ApprovalRules"),
                T::Suffix("Config"),
                T::Suffix("Policy"),
                T::Suffix("Duration"),
                T::Suffix("Interval"),
                T::Suffix("Cvl"),
            ],
        },
    ],
    name_rules: &[
        NameRule {
            category: Category::Identity,
            patterns: &[N::Suffix("_id"), N::Exact("id")],
        },
        NameRule {
            category: Category::FlowControl,
            patterns: &[
                N::Contains("status"),
                N::Contains("state"),
                N::Contains("approved"),
                N::Contains("type"),
            ],
        },
        NameRule {
            category: Category::Amount,
            patterns: &[
                N::Contains("amount"),
                N::Contains("price"),
                N::Contains("rate"),
                N::Contains("ratio"),
                N::Contains("fee"),
            ],
        },
        NameRule {
            category: Category::Temporal,
            patterns: &[
                N::Contains("date"),
                N::Contains("time"),
                N::Contains("at"),
                N::Contains("period"),
            ],
        },
        NameRule {
            category: Category::Metadata,
            patterns: &[
                N::Contains("name"),
                N::Contains("email"),
                N::Contains("description"),
                N::Contains("reference"),
                N::Contains("handle"),
            ],
        },
    ],
    fallback: Category::Metadata,
};

///
/// Classifier
///

#[derive(Clone, Copy, Debug)]
pub struct Classifier<'a> {
    rules: &'a ClassifierRules,
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(rules: &'a ClassifierRules) -> Self {
        Self { rules }
    }

    #[must_use]
    pub const fn rules(&self) -> &'a ClassifierRules {
        self.rules
    }

    /// Category of a field. `ty` is the declared type with any outer
    /// `Option<..>` already removed.
    #[must_use]
    pub fn classify(&self, name: &str, ty: &str) -> Category {
        let ty = ty.trim();
        if let Some(rule) = self
            .rules
            .type_rules
            .iter()
            .find(|r| r.patterns.iter().any(|p| p.matches(ty)))
        {
            return rule.category;
        }

        let name = name.to_lowercase();
        self.rules
            .name_rules
            .iter()
            .find(|r| r.patterns.iter().any(|p| p.matches(&name)))
            .map_or(self.rules.fallback, |r| r.category)
    }
}

impl Default for Classifier<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_RULES)
    }
}

///
/// TESTS
///
