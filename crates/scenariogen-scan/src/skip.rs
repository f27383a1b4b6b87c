use derive_more::Display;
use std::path::PathBuf;

///
/// SkipReason
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum SkipReason {
    #[display("unreadable file: {_0}")]
    Unreadable(String),

    #[display("unexpected shape: {_0}")]
    UnexpectedShape(String),

    #[display("excluded by marker '{_0}'")]
    Excluded(String),

    #[display("shadowed by {kept} ({cause})")]
    Shadowed { kept: String, cause: String },
}

///
/// ScanSkip
///
/// Something the scanner could not use. Collected and reported, never
/// fatal to the scan.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{}{}: {reason}", file.display(), item.as_ref().map(|i| format!(" [{i}]")).unwrap_or_default())]
pub struct ScanSkip {
    pub file: PathBuf,
    pub item: Option<String>,
    pub reason: SkipReason,
}

impl ScanSkip {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, item: Option<&str>, reason: SkipReason) -> Self {
        Self {
            file: file.into(),
            item: item.map(ToString::to_string),
            reason,
        }
    }
}
