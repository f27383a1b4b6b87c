//! Declaration extraction from one source file.
//!
//! Pattern matching over comment-stripped text. Anything that does not fit
//! the expected shape becomes a [`ScanSkip`] instead of an error.

use crate::{
    skip::{ScanSkip, SkipReason},
    text::{
        matching_close, normalize_type, split_top_level, strip_attributes, strip_comments,
        strip_visibility,
    },
};
use regex::Regex;
use scenariogen_schema::{prelude::*, registry::strip_option};
use std::{path::Path, sync::LazyLock};

static ITEM_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*pub(?:[ \t]*\([^)]*\))?[ \t]+(struct|enum)[ \t]+([A-Za-z_]\w*)")
        .expect("item header pattern is valid")
});

static NAMED_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:r#)?([A-Za-z_]\w*)\s*(.*)$").expect("named part pattern is valid")
});

static SERDE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btag\s*=\s*""#).expect("tag pattern is valid"));

static SERDE_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bcontent\s*=\s*""#).expect("content pattern is valid"));

static SERDE_UNTAGGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\buntagged\b").expect("untagged pattern is valid"));

static SERDE_RENAME_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brename_all\s*=\s*"([^"]+)""#).expect("rename_all pattern is valid")
});

///
/// SerdeAttrs
/// container-level serde settings found above a declaration
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SerdeAttrs {
    pub tagging: TaggingMode,
    pub rename_rule: Option<RenameRule>,
}

impl SerdeAttrs {
    /// Read every `#[serde(..)]` group in `attrs`.
    #[must_use]
    pub fn parse(attrs: &str) -> Self {
        let mut tag = false;
        let mut content = false;
        let mut untagged = false;
        let mut rename_rule = None;

        let mut rest = attrs;
        while let Some(pos) = rest.find("serde(") {
            let body = &rest[pos + "serde(".len()..];
            let end = matching_close(body, '(', ')').unwrap_or(body.len());
            let group = &body[..end];

            tag |= SERDE_TAG.is_match(group);
            content |= SERDE_CONTENT.is_match(group);
            untagged |= SERDE_UNTAGGED.is_match(group);
            if let Some(caps) = SERDE_RENAME_ALL.captures(group) {
                rename_rule = RenameRule::from_attr(&caps[1]).or(rename_rule);
            }

            rest = &body[end..];
        }

        let tagging = match (untagged, tag, content) {
            (true, _, _) => TaggingMode::Untagged,
            (false, true, true) => TaggingMode::Adjacent,
            (false, true, false) => TaggingMode::Internal,
            _ => TaggingMode::External,
        };

        Self {
            tagging,
            rename_rule,
        }
    }
}

///
/// DeclBody
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeclBody {
    Struct(Vec<RawField>),
    Tuple(Vec<String>),
    Unit,
    Enum(Vec<RawVariant>),
}

///
/// Declaration
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub serde: SerdeAttrs,
    pub body: DeclBody,
}

impl Declaration {
    /// Registry form. Single-element tuple structs are newtypes; wider
    /// tuples become structs with positional field names.
    #[must_use]
    pub fn into_definition(self, source_file: &str) -> TypeDefinition {
        let def = match self.body {
            DeclBody::Struct(fields) => TypeDefinition::structure(&self.name, fields),
            DeclBody::Unit => TypeDefinition::structure(&self.name, Vec::new()),
            DeclBody::Tuple(mut types) if types.len() == 1 => {
                TypeDefinition::newtype(&self.name, types.remove(0))
            }
            DeclBody::Tuple(types) => TypeDefinition::structure(
                &self.name,
                types
                    .into_iter()
                    .enumerate()
                    .map(|(i, ty)| raw_field(i.to_string(), ty))
                    .collect(),
            ),
            DeclBody::Enum(variants) => TypeDefinition::enumeration(&self.name, variants)
                .with_serde(self.serde.tagging, self.serde.rename_rule),
        };

        def.with_source(source_file)
    }
}

///
/// Extracted
///

#[derive(Debug, Default)]
pub struct Extracted {
    pub declarations: Vec<Declaration>,
    pub skips: Vec<ScanSkip>,
}

/// Extract every `pub struct` / `pub enum` declaration in `src`.
#[must_use]
pub fn extract(file: &Path, src: &str) -> Extracted {
    let clean = strip_comments(src);
    let mut out = Extracted::default();

    for caps in ITEM_HEADER.captures_iter(&clean) {
        let (Some(whole), Some(kind), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let tail = skip_generics(&clean[whole.end()..]);
        let serde = SerdeAttrs::parse(&preceding_attributes(&clean[..whole.start()]));

        let body = match kind.as_str() {
            "enum" => enum_body(file, name, tail, &mut out.skips),
            _ => struct_body(file, name, tail, &mut out.skips),
        };

        if let Some(body) = body {
            out.declarations.push(Declaration {
                name: name.to_string(),
                serde,
                body,
            });
        }
    }

    out
}

// skip_generics
// `<T: Clone>` directly after the name
fn skip_generics(tail: &str) -> &str {
    let tail = tail.trim_start();

    tail.strip_prefix('<')
        .and_then(|rest| matching_close(rest, '<', '>').map(|end| rest[end + 1..].trim_start()))
        .unwrap_or(tail)
}

// preceding_attributes
// walk back over attribute lines until the previous item ends
fn preceding_attributes(before: &str) -> String {
    let mut lines = Vec::new();

    for line in before.lines().rev() {
        let trimmed = line.trim();
        if trimmed.ends_with(['}', ';', '{']) {
            break;
        }
        lines.push(trimmed);
    }
    lines.reverse();

    lines.join(" ")
}

fn struct_body(
    file: &Path,
    name: &str,
    tail: &str,
    skips: &mut Vec<ScanSkip>,
) -> Option<DeclBody> {
    if let Some(inner) = tail.strip_prefix('(') {
        let Some(end) = matching_close(inner, '(', ')') else {
            skips.push(shape_skip(file, name, "unterminated tuple struct"));
            return None;
        };
        let types = split_top_level(&strip_attributes(&inner[..end]), ',')
            .into_iter()
            .map(|t| normalize_type(strip_visibility(t)))
            .collect();

        return Some(DeclBody::Tuple(types));
    }

    match tail.find(['{', ';']).map(|i| (i, &tail[i..])) {
        Some((_, rest)) if rest.starts_with(';') => Some(DeclBody::Unit),
        Some((i, _)) => {
            let inner = &tail[i + 1..];
            let Some(end) = matching_close(inner, '{', '}') else {
                skips.push(shape_skip(file, name, "unterminated struct body"));
                return None;
            };

            Some(DeclBody::Struct(fields(file, name, &inner[..end], skips)))
        }
        None => {
            skips.push(shape_skip(file, name, "no struct body"));
            None
        }
    }
}

fn enum_body(file: &Path, name: &str, tail: &str, skips: &mut Vec<ScanSkip>) -> Option<DeclBody> {
    let Some(open) = tail.find('{') else {
        skips.push(shape_skip(file, name, "no enum body"));
        return None;
    };
    let inner = &tail[open + 1..];
    let Some(end) = matching_close(inner, '{', '}') else {
        skips.push(shape_skip(file, name, "unterminated enum body"));
        return None;
    };

    let body = strip_attributes(&inner[..end]);
    let mut variants = Vec::new();

    for part in split_top_level(&body, ',') {
        let Some(caps) = NAMED_PART.captures(part) else {
            skips.push(shape_skip(file, name, &format!("unreadable variant '{part}'")));
            continue;
        };
        let variant = &caps[1];
        let rest = caps[2].trim();

        if !variant.starts_with(|c: char| c.is_ascii_uppercase()) {
            skips.push(shape_skip(
                file,
                &format!("{name}::{variant}"),
                "variant name is not PascalCase",
            ));
            continue;
        }

        let parsed = if rest.is_empty() || rest.starts_with('=') {
            Some(RawVariant::unit(variant))
        } else if let Some(fields_src) = rest.strip_prefix('{') {
            let end = matching_close(fields_src, '{', '}').unwrap_or(fields_src.len());
            let path = format!("{name}::{variant}");
            Some(RawVariant::structure(
                variant,
                fields(file, &path, &fields_src[..end], skips),
            ))
        } else if let Some(types_src) = rest.strip_prefix('(') {
            let end = matching_close(types_src, '(', ')').unwrap_or(types_src.len());
            let types = split_top_level(&types_src[..end], ',')
                .into_iter()
                .map(normalize_type)
                .collect();
            Some(RawVariant::tuple(variant, types))
        } else {
            None
        };

        match parsed {
            Some(v) => variants.push(v),
            None => skips.push(shape_skip(
                file,
                &format!("{name}::{variant}"),
                "unrecognised variant body",
            )),
        }
    }

    Some(DeclBody::Enum(variants))
}

// fields
// `name: Type` pairs in declaration order
fn fields(file: &Path, owner: &str, src: &str, skips: &mut Vec<ScanSkip>) -> Vec<RawField> {
    let src = strip_attributes(src);

    split_top_level(&src, ',')
        .into_iter()
        .filter_map(|part| {
            let part = strip_visibility(part);
            let parsed = NAMED_PART.captures(part).and_then(|caps| {
                let ty = caps[2].trim().strip_prefix(':')?;
                (!ty.starts_with(':')).then(|| raw_field(caps[1].to_string(), normalize_type(ty)))
            });
            if parsed.is_none() {
                skips.push(shape_skip(file, owner, &format!("unreadable field '{part}'")));
            }
            parsed
        })
        .collect()
}

fn raw_field(name: String, ty: String) -> RawField {
    let optional = strip_option(&ty).1;

    RawField::new(name, ty).optional(optional)
}

fn shape_skip(file: &Path, item: &str, why: &str) -> ScanSkip {
    ScanSkip::new(file, Some(item), SkipReason::UnexpectedShape(why.to_string()))
}

///
/// TESTS
///
