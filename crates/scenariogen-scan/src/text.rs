//! Low-level text helpers. None of these understand the grammar; they only
//! track nesting depth and literal boundaries well enough for declarations.

/// Remove `//` and (nested) `/* */` comments, keeping string literals and
/// line breaks intact.
#[must_use]
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push(c);
                while let Some(s) = chars.next() {
                    out.push(s);
                    match s {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for s in chars.by_ref() {
                    if s == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut depth = 1usize;
                let mut prev = '\0';
                while depth > 0 {
                    let Some(s) = chars.next() else { break };
                    match (prev, s) {
                        ('/', '*') => {
                            depth += 1;
                            prev = '\0';
                            continue;
                        }
                        ('*', '/') => {
                            depth -= 1;
                            prev = '\0';
                            continue;
                        }
                        (_, '\n') => out.push('\n'),
                        _ => {}
                    }
                    prev = s;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Remove every `#[..]` / `#![..]` attribute, bracket-aware.
#[must_use]
pub fn strip_attributes(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;

    while let Some(pos) = rest.find('#') {
        out.push_str(&rest[..pos]);
        let after = rest[pos + 1..].trim_start_matches('!');
        match after.strip_prefix('[') {
            Some(body) => match matching_close(body, '[', ']') {
                Some(end) => rest = &body[end + 1..],
                None => return out,
            },
            None => {
                out.push('#');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);

    out
}

/// Byte index of the bracket closing an already-opened `open`, searching
/// from the start of `s`.
#[must_use]
pub fn matching_close(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 1usize;

    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }

    None
}

/// Split on `sep` outside `<>`, `()`, `[]` and `{}`. Empty pieces are
/// dropped and the rest trimmed.
#[must_use]
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            // `->` in fn pointer types is not a closing angle
            '>' if i > 0 && s.as_bytes()[i - 1] == b'-' => {}
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
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Collapse runs of whitespace into one space.
#[must_use]
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalise a declared type: squash whitespace and drop the spaces around
/// `<`, `>`, `::` and after `&` so `Option< Vec <u8> >` reads `Option<Vec<u8>>`.
#[must_use]
pub fn normalize_type(s: &str) -> String {
    let squashed = squash_whitespace(s);
    let mut out = String::with_capacity(squashed.len());
    let chars: Vec<char> = squashed.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let glued = matches!(prev, Some('<' | ':' | '&' | '('))
                || matches!(next, Some('<' | '>' | ':' | ',' | ')'));
            if glued {
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Strip a leading visibility qualifier (`pub`, `pub(crate)`, ...).
#[must_use]
pub fn strip_visibility(s: &str) -> &str {
    let s = s.trim_start();
    let Some(rest) = s.strip_prefix("pub") else {
        return s;
    };
    let rest_trimmed = rest.trim_start();

    if let Some(scope) = rest_trimmed.strip_prefix('(') {
        return matching_close(scope, '(', ')').map_or(s, |end| scope[end + 1..].trim_start());
    }
    if rest.starts_with(char::is_whitespace) {
        return rest_trimmed;
    }

    s
}

///
/// TESTS
///
