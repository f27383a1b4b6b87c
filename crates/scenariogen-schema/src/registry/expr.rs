//! Best-effort splitting of type strings into a base name and generic
//! arguments. Not a grammar; unbalanced input degrades to a bare name.

///
/// TypeExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum TypeExpr<'a> {
    /// `[T; N]` or `[T]`
    Array(&'a str),

    /// `(A, B)` or `()`
    Tuple,

    /// `path::Base<args..>`
    Path { base: &'a str, args: Vec<&'a str> },
}

impl<'a> TypeExpr<'a> {
    pub(crate) fn parse(raw: &'a str) -> Self {
        let ty = strip_reference(raw.trim());

        if let Some(inner) = ty.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let item = split_top_level(inner, ';')
                .into_iter()
                .next()
                .unwrap_or(inner);
            return Self::Array(item.trim());
        }

        if ty.starts_with('(') {
            return Self::Tuple;
        }

        match split_generic(ty) {
            Some((base, args)) => Self::Path { base, args },
            None => Self::Path {
                base: ty,
                args: Vec::new(),
            },
        }
    }
}

/// Last path segment: `chrono::DateTime` -> `DateTime`.
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// Remove one `Option<..>` layer, reporting whether it was present.
#[must_use]
pub fn strip_option(raw: &str) -> (&str, bool) {
    let ty = raw.trim();
    if let Some((base, args)) = split_generic(ty)
        && last_segment(base) == "Option"
        && let [inner] = args.as_slice()
    {
        return (*inner, true);
    }

    (ty, false)
}

// strip_reference
// `&'a mut T` -> `T`
fn strip_reference(ty: &str) -> &str {
    let Some(rest) = ty.strip_prefix('&') else {
        return ty;
    };
    let mut rest = rest.trim_start();
    if rest.starts_with('\'') {
        rest = rest
            .split_once(char::is_whitespace)
            .map_or(rest, |(_, tail)| tail.trim_start());
    }

    rest.strip_prefix("mut ").unwrap_or(rest).trim()
}

// split_generic
// returns None when the string has no (balanced) generic argument list
fn split_generic(ty: &str) -> Option<(&str, Vec<&str>)> {
    let open = ty.find('<')?;
    let close = ty.rfind('>')?;
    if close < open || close != ty.len() - 1 {
        return None;
    }

    let base = ty[..open].trim();
    let args = split_top_level(&ty[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();

    Some((base, args))
}

/// Split on `sep` where it is not nested inside `<>`, `()` or `[]`.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts
}

///
/// TESTS
///
