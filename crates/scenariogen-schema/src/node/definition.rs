use crate::prelude::*;
use std::ops::Not;

///
/// DefinitionKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum DefinitionKind {
    #[display("struct")]
    Struct,
    #[display("newtype")]
    Newtype,
    #[display("enum")]
    Enum,
}

///
/// TypeDefinition
///
/// Raw declaration as produced by the scanner, before any resolution.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub name: String,

    #[serde(default)]
    pub source_file: String,

    #[serde(flatten)]
    pub body: DefinitionBody,
}

impl TypeDefinition {
    #[must_use]
    pub fn structure(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self::new(name, DefinitionBody::Struct { fields })
    }

    #[must_use]
    pub fn newtype(name: impl Into<String>, inner_type: impl Into<String>) -> Self {
        Self::new(
            name,
            DefinitionBody::Newtype {
                inner_type: inner_type.into(),
            },
        )
    }

    #[must_use]
    pub fn enumeration(name: impl Into<String>, variants: Vec<RawVariant>) -> Self {
        Self::new(
            name,
            DefinitionBody::Enum {
                variants,
                tagging: TaggingMode::External,
                rename_rule: None,
            },
        )
    }

    fn new(name: impl Into<String>, body: DefinitionBody) -> Self {
        Self {
            name: name.into(),
            source_file: String::new(),
            body,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    /// Set serde tagging details. No-op for non-enum definitions.
    #[must_use]
    pub fn with_serde(mut self, mode: TaggingMode, rule: Option<RenameRule>) -> Self {
        if let DefinitionBody::Enum {
            tagging,
            rename_rule,
            ..
        } = &mut self.body
        {
            *tagging = mode;
            *rename_rule = rule;
        }
        self
    }

    #[must_use]
    pub const fn kind(&self) -> DefinitionKind {
        match self.body {
            DefinitionBody::Struct { .. } => DefinitionKind::Struct,
            DefinitionBody::Newtype { .. } => DefinitionKind::Newtype,
            DefinitionBody::Enum { .. } => DefinitionKind::Enum,
        }
    }
}

///
/// DefinitionBody
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionBody {
    Struct {
        fields: Vec<RawField>,
    },
    Newtype {
        inner_type: String,
    },
    Enum {
        variants: Vec<RawVariant>,

        #[serde(default, skip_serializing_if = "TaggingMode::is_external")]
        tagging: TaggingMode,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        rename_rule: Option<RenameRule>,
    },
}

///
/// RawField
/// (name, declared type, optional) as written in the source
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawField {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub optional: bool,
}

impl RawField {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

///
/// RawVariant
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawVariant {
    pub name: String,

    #[serde(flatten)]
    pub shape: RawVariantShape,
}

impl RawVariant {
    #[must_use]
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: RawVariantShape::Unit,
        }
    }

    #[must_use]
    pub fn structure(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            shape: RawVariantShape::Struct { fields },
        }
    }

    #[must_use]
    pub fn tuple(name: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            shape: RawVariantShape::Tuple { types },
        }
    }
}

///
/// RawVariantShape
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RawVariantShape {
    Unit,
    Struct { fields: Vec<RawField> },
    Tuple { types: Vec<String> },
}
