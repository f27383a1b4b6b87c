use derive_more::Display;

///
/// UnknownReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum UnknownReason {
    #[display("expected Record::Variant")]
    Malformed,

    #[display("unknown event record")]
    UnknownRecord,

    #[display("unknown variant")]
    UnknownVariant,
}

///
/// Diagnostic
///
/// Non-fatal generation finding. Unknown references replace the record;
/// missing inputs are attached to a record that is still emitted.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Diagnostic {
    #[display("day {day}: unknown reference '{reference}' ({reason})")]
    UnknownReference {
        day: u32,
        reference: String,
        reason: UnknownReason,
    },

    #[display("day {day}: '{reference}' is missing required input '{field}'")]
    MissingRequiredInput {
        day: u32,
        reference: String,
        field: String,
    },
}

impl Diagnostic {
    #[must_use]
    pub const fn day(&self) -> u32 {
        match self {
            Self::UnknownReference { day, .. } | Self::MissingRequiredInput { day, .. } => *day,
        }
    }

    #[must_use]
    pub const fn is_unknown_reference(&self) -> bool {
        matches!(self, Self::UnknownReference { .. })
    }
}
