use crate::prelude::*;
use std::{collections::BTreeSet, fmt, ops::Not};

///
/// ResolvedType
///
/// Fully expanded structure of a type reference. One payload shape per
/// kind; a `List` can never carry variant data.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedType {
    Scalar {
        name: String,

        #[serde(default, skip_serializing_if = "ScalarOrigin::is_primitive")]
        origin: ScalarOrigin,
    },

    Struct {
        name: String,
        fields: Vec<TypeField>,
    },

    Newtype {
        name: String,
        inner: Box<Self>,
    },

    Enum {
        name: String,
        variants: Vec<EnumVariant>,

        #[serde(default, skip_serializing_if = "TaggingMode::is_external")]
        tagging: TaggingMode,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        rename_rule: Option<RenameRule>,
    },

    #[serde(rename = "vec")]
    List {
        item: Box<Self>,
    },

    #[serde(rename = "option")]
    Optional {
        item: Box<Self>,
    },

    Map {
        key: Box<Self>,
        value: Box<Self>,
    },
}

impl ResolvedType {
    #[must_use]
    pub fn scalar(name: impl Into<String>, origin: ScalarOrigin) -> Self {
        Self::Scalar {
            name: name.into(),
            origin,
        }
    }

    #[must_use]
    pub fn cycle(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarOrigin::Cycle)
    }

    #[must_use]
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarOrigin::Opaque)
    }

    #[must_use]
    pub fn list(item: Self) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    #[must_use]
    pub fn optional(item: Self) -> Self {
        Self::Optional {
            item: Box::new(item),
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar { .. } => "scalar",
            Self::Struct { .. } => "struct",
            Self::Newtype { .. } => "newtype",
            Self::Enum { .. } => "enum",
            Self::List { .. } => "vec",
            Self::Optional { .. } => "option",
            Self::Map { .. } => "map",
        }
    }

    /// Returns the referenced type name if this node is a cycle marker.
    #[must_use]
    pub fn cycle_target(&self) -> Option<&str> {
        match self {
            Self::Scalar {
                name,
                origin: ScalarOrigin::Cycle,
            } => Some(name),
            _ => None,
        }
    }

    /// Names of every cycle marker reachable from this node.
    #[must_use]
    pub fn cycle_targets(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_cycles(&mut out);
        out
    }

    fn collect_cycles(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Scalar { .. } => {
                if let Some(target) = self.cycle_target() {
                    out.insert(target.to_string());
                }
            }
            Self::Struct { fields, .. } => {
                for field in fields {
                    field.resolved.collect_cycles(out);
                }
            }
            Self::Enum { variants, .. } => {
                for variant in variants {
                    variant.for_each_type(|ty| ty.collect_cycles(out));
                }
            }
            Self::Newtype { inner: item, .. }
            | Self::List { item }
            | Self::Optional { item } => item.collect_cycles(out),
            Self::Map { key, value } => {
                key.collect_cycles(out);
                value.collect_cycles(out);
            }
        }
    }

    /// Longest chain of nested nodes, counting this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let children = match self {
            Self::Scalar { .. } => 0,
            Self::Struct { fields, .. } => fields
                .iter()
                .map(|f| f.resolved.depth())
                .max()
                .unwrap_or(0),
            Self::Enum { variants, .. } => {
                let mut deepest = 0;
                for variant in variants {
                    variant.for_each_type(|ty| deepest = deepest.max(ty.depth()));
                }
                deepest
            }
            Self::Newtype { inner: item, .. }
            | Self::List { item }
            | Self::Optional { item } => item.depth(),
            Self::Map { key, value } => key.depth().max(value.depth()),
        };

        children + 1
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar {
                name,
                origin: ScalarOrigin::Cycle,
            } => write!(f, "<cycle:{name}>"),
            Self::Scalar { name, .. }
            | Self::Struct { name, .. }
            | Self::Newtype { name, .. }
            | Self::Enum { name, .. } => f.write_str(name),
            Self::List { item } => write!(f, "Vec<{item}>"),
            Self::Optional { item } => write!(f, "Option<{item}>"),
            Self::Map { key, value } => write!(f, "Map<{key}, {value}>"),
        }
    }
}

///
/// TypeField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeField {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub optional: bool,

    pub resolved: ResolvedType,
}

///
/// EnumVariant
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumVariant {
    pub name: String,

    #[serde(flatten)]
    pub shape: VariantShape,
}

impl EnumVariant {
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self.shape, VariantShape::Unit)
    }

    fn for_each_type(&self, mut f: impl FnMut(&ResolvedType)) {
        match &self.shape {
            VariantShape::Unit => {}
            VariantShape::Struct { fields } => fields.iter().for_each(|field| f(&field.resolved)),
            VariantShape::Tuple { types } => types.iter().for_each(f),
        }
    }
}

///
/// VariantShape
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum VariantShape {
    Unit,
    Struct { fields: Vec<TypeField> },
    Tuple { types: Vec<ResolvedType> },
}
