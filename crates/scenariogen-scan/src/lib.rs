//! Best-effort declaration scanner.
//!
//! Walks one or more source roots and pulls out struct, newtype and enum
//! declarations plus event records. This is textual matching, not a parser:
//! anything it cannot read is reported as a [`ScanSkip`] and the scan goes
//! on.

pub mod extract;
pub mod skip;
pub mod text;
pub mod walk;

pub use skip::{ScanSkip, SkipReason};

use extract::{DeclBody, Declaration, extract};
use scenariogen_schema::{
    prelude::*,
    registry::{Ranked, Shadowed, select_by_precedence},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("scan root '{}' does not exist", .0.display())]
    RootNotFound(PathBuf),

    #[error("no scan roots given")]
    NoRoots,
}

///
/// ScanRoot
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanRoot {
    pub path: PathBuf,
    pub precedence: i32,
}

impl ScanRoot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, precedence: i32) -> Self {
        Self {
            path: path.into(),
            precedence,
        }
    }
}

///
/// Scanner
///

#[derive(Clone, Copy, Debug)]
pub struct Scanner<'a> {
    naming: &'a TableNaming,
    skip_markers: &'a [String],
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub const fn new(naming: &'a TableNaming, skip_markers: &'a [String]) -> Self {
        Self {
            naming,
            skip_markers,
        }
    }

    /// Scan every root. Roots are walked in the order given and files in
    /// sorted order, so ties between equal precedences are stable.
    pub fn scan(&self, roots: &[ScanRoot]) -> Result<ScanOutput, Error> {
        if roots.is_empty() {
            return Err(Error::NoRoots);
        }

        let mut out = ScanOutput::default();
        for root in roots {
            if !root.path.exists() {
                return Err(Error::RootNotFound(root.path.clone()));
            }

            let files = walk::source_files(&root.path, &mut out.skips);
            tracing::debug!(root = %root.path.display(), files = files.len(), "scanning root");

            for file in files {
                let relative = file.strip_prefix(&root.path).unwrap_or(&file);
                match fs::read_to_string(&file) {
                    Ok(src) => self.scan_source(relative, &src, root.precedence, &mut out),
                    Err(err) => out.skips.push(ScanSkip::new(
                        relative,
                        None,
                        SkipReason::Unreadable(err.to_string()),
                    )),
                }
            }
        }

        tracing::info!(
            definitions = out.definitions.len(),
            events = out.events.len(),
            skips = out.skips.len(),
            "scan finished"
        );

        Ok(out)
    }

    /// Scan one file's text. `file` is the path recorded as provenance.
    pub fn scan_source(&self, file: &Path, src: &str, precedence: i32, out: &mut ScanOutput) {
        let extracted = extract(file, src);
        out.skips.extend(extracted.skips);

        let source = file.to_string_lossy().replace('\\', "/");
        for decl in extracted.declarations {
            if matches!(decl.body, DeclBody::Enum(_)) && self.naming.is_record_name(&decl.name) {
                if let Some(marker) = self.skip_markers.iter().find(|m| decl.name.contains(m.as_str())) {
                    tracing::debug!(record = %decl.name, %marker, "event record excluded");
                    out.skips.push(ScanSkip::new(
                        file,
                        Some(decl.name.as_str()),
                        SkipReason::Excluded(marker.clone()),
                    ));
                    continue;
                }

                let record = self.record(file, &source, decl, &mut out.skips);
                out.events
                    .push(Ranked::new(record.name.clone(), &source, precedence, record));
            } else {
                out.definitions.push(Ranked::new(
                    decl.name.clone(),
                    &source,
                    precedence,
                    decl.into_definition(&source),
                ));
            }
        }
    }

    // record
    // event records only keep named fields; tuple payloads are reported
    fn record(
        &self,
        file: &Path,
        source: &str,
        decl: Declaration,
        skips: &mut Vec<ScanSkip>,
    ) -> RawEventEnum {
        let DeclBody::Enum(variants) = decl.body else {
            return RawEventEnum::new(decl.name, Vec::new()).with_source(source);
        };

        let variants = variants
            .into_iter()
            .map(|v| match v.shape {
                RawVariantShape::Struct { fields } => RawEventVariant::new(v.name, fields),
                RawVariantShape::Unit => RawEventVariant::new(v.name, Vec::new()),
                RawVariantShape::Tuple { .. } => {
                    skips.push(ScanSkip::new(
                        file,
                        Some(format!("{}::{}", decl.name, v.name).as_str()),
                        SkipReason::UnexpectedShape("tuple payload has no named fields".to_string()),
                    ));
                    RawEventVariant::new(v.name, Vec::new())
                }
            })
            .collect();

        tracing::debug!(record = %decl.name, table = %self.naming.table_name(&decl.name), "event record found");

        RawEventEnum::new(decl.name, variants)
            .with_source(source)
            .with_rename_rule(decl.serde.rename_rule)
    }
}

///
/// ScanOutput
///

#[derive(Debug, Default)]
pub struct ScanOutput {
    pub definitions: Vec<Ranked<TypeDefinition>>,
    pub events: Vec<Ranked<RawEventEnum>>,
    pub skips: Vec<ScanSkip>,
}

impl ScanOutput {
    ///
    /// build_schema
    ///
    /// Resolve precedence for definitions and records, then build the
    /// event schema. Discarded duplicates are appended to the skips.
    ///
    #[must_use]
    pub fn build_schema(
        self,
        ctx: SchemaContext<'_>,
        provenance: Provenance,
    ) -> (EventSchema, Vec<ScanSkip>) {
        let mut skips = self.skips;

        let (registry, shadowed_types) = TypeRegistry::build(self.definitions);
        let (events, shadowed_events) = select_by_precedence(self.events);
        skips.extend(
            shadowed_types
                .into_iter()
                .chain(shadowed_events)
                .map(shadow_skip),
        );

        let schema = EventSchema::build(registry, events.into_iter().map(|r| r.item), ctx, provenance);

        (schema, skips)
    }
}

fn shadow_skip(s: Shadowed) -> ScanSkip {
    ScanSkip::new(
        s.discarded_source,
        Some(s.name.as_str()),
        SkipReason::Shadowed {
            kept: s.kept_source,
            cause: s.reason.to_string(),
        },
    )
}
