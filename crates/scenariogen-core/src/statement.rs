//! Parameterised SQL statements and batches.
//!
//! Values always travel as bound parameters. Scripts sent to an executor
//! keep them bound through psql's `\bind`; the only place they become SQL
//! text is [`Statement::render`], which routes every parameter through
//! [`quote_literal`] for saved scripts.

use crate::ThisError;
use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::Display;
use serde_json::Value;
use std::fmt::Write as _;

/// PostgreSQL truncates identifiers beyond this length.
pub const MAX_IDENTIFIER_LEN: usize = 63;

const INSERT_EVENT: &str = "INSERT INTO {table} (id, sequence, event_type, event, recorded_at) \
     VALUES ($1, $2, $3, $4::jsonb, $5::timestamptz)";

///
/// StatementError
///

#[derive(Debug, ThisError)]
pub enum StatementError {
    #[error("invalid table identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("parameter ${index} contains a NUL byte")]
    NulByte { index: usize },

    #[error("statement references ${index} but has {count} parameters")]
    MissingParam { index: usize, count: usize },
}

///
/// SqlParam
///

#[derive(Clone, Debug, Display, PartialEq)]
pub enum SqlParam {
    #[display("{_0}")]
    Text(String),

    #[display("{_0}")]
    Int(i64),

    #[display("{_0}")]
    Json(Value),

    #[display("{}", _0.to_rfc3339_opts(SecondsFormat::AutoSi, true))]
    Timestamp(DateTime<Utc>),
}

impl SqlParam {
    /// SQL literal form. Numbers are emitted bare, everything else quoted.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            other => quote_literal(&other.to_string()),
        }
    }
}

/// Single-quoted SQL string literal; embedded quotes are doubled.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');

    out
}

/// Single-quoted psql meta-command argument. The value reaches the server
/// as a bind parameter, never as SQL.
#[must_use]
pub fn quote_bind_arg(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');

    out
}

/// Lower snake_case, starting with a letter or underscore, at most
/// [`MAX_IDENTIFIER_LEN`] bytes.
pub fn validate_identifier(ident: &str) -> Result<(), StatementError> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && ident.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(StatementError::InvalidIdentifier(ident.to_string()))
    }
}

///
/// Statement
///

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Statement {
    /// The event-append insert used for every generated record.
    pub fn insert_event(
        table: &str,
        entity_id: &str,
        sequence: u64,
        event_type: &str,
        payload: Value,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, StatementError> {
        validate_identifier(table)?;

        let params = vec![
            SqlParam::Text(entity_id.to_string()),
            SqlParam::Int(i64::try_from(sequence).unwrap_or(i64::MAX)),
            SqlParam::Text(event_type.to_string()),
            SqlParam::Json(payload),
            SqlParam::Timestamp(recorded_at),
        ];
        for (i, p) in params.iter().enumerate() {
            if p.to_string().contains('\0') {
                return Err(StatementError::NulByte { index: i + 1 });
            }
        }

        Ok(Self {
            sql: INSERT_EVENT.replace("{table}", table),
            params,
        })
    }

    ///
    /// render
    ///
    /// Inline the parameters as literals. `$n` placeholders are replaced
    /// left to right; a `$` not followed by digits is copied unchanged.
    ///
    pub fn render(&self) -> Result<String, StatementError> {
        let mut out = String::with_capacity(self.sql.len() + 64);
        let mut rest = self.sql.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();

            if digits == 0 {
                out.push('$');
                rest = after;
                continue;
            }

            let index: usize = after[..digits].parse().unwrap_or(0);
            let param = index
                .checked_sub(1)
                .and_then(|i| self.params.get(i))
                .ok_or(StatementError::MissingParam {
                    index,
                    count: self.params.len(),
                })?;
            out.push_str(&param.to_literal());
            rest = &after[digits..];
        }
        out.push_str(rest);

        Ok(out)
    }

    /// psql form that sends the parameters as binds:
    /// `<sql> \bind '<p1>' ... \g`. Requires psql 16 or later.
    #[must_use]
    pub fn render_bound(&self) -> String {
        let mut out = self.sql.clone();

        out.push_str(" \\bind");
        for param in &self.params {
            out.push(' ');
            out.push_str(&quote_bind_arg(&param.to_string()));
        }
        out.push_str(" \\g");

        out
    }
}

///
/// BatchItem
///

#[derive(Clone, Debug, PartialEq)]
pub enum BatchItem {
    Comment(String),
    Statement(Statement),
}

///
/// Batch
///
/// Ordered statements applied as one unit, with header comments.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub header: Vec<String>,
    pub items: Vec<BatchItem>,
}

impl Batch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    pub fn comment(&mut self, line: impl Into<String>) {
        self.items.push(BatchItem::Comment(line.into()));
    }

    pub fn push(&mut self, statement: Statement) {
        self.items.push(BatchItem::Statement(statement));
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.items.iter().filter_map(|item| match item {
            BatchItem::Statement(s) => Some(s),
            BatchItem::Comment(_) => None,
        })
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.statements().count()
    }

    /// Statements with inlined literals, no transaction control.
    pub fn render_body(&self) -> Result<String, StatementError> {
        let mut out = String::new();

        for item in &self.items {
            match item {
                BatchItem::Comment(c) => {
                    let _ = writeln!(out, "-- {}", single_line(c));
                }
                BatchItem::Statement(s) => {
                    let _ = writeln!(out, "{};\n", s.render()?);
                }
            }
        }

        Ok(out)
    }

    /// Self-contained psql script wrapped in `BEGIN;` / `COMMIT;`.
    pub fn render_script(&self) -> Result<String, StatementError> {
        let mut out = String::new();

        for line in &self.header {
            let _ = writeln!(out, "-- {}", single_line(line));
        }
        if !self.header.is_empty() {
            out.push('\n');
        }
        out.push_str("BEGIN;\n\n");
        out.push_str(&self.render_body()?);
        out.push_str("COMMIT;\n");

        Ok(out)
    }

    ///
    /// to_script
    ///
    /// Executor form of the batch. Values stay bound parameters; the
    /// executor supplies the transaction.
    ///
    pub fn to_script(&self) -> Result<Script, StatementError> {
        let mut text = String::new();

        for item in &self.items {
            match item {
                BatchItem::Comment(c) => {
                    let _ = writeln!(text, "-- {}", single_line(c));
                }
                BatchItem::Statement(s) => {
                    let _ = writeln!(text, "{}\n", s.render_bound());
                }
            }
        }

        Ok(Script {
            text,
            statements: self.statement_count(),
            transactional: false,
        })
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

///
/// Script
///
/// SQL text handed to an executor. `transactional` scripts carry their own
/// `BEGIN` / `COMMIT`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Script {
    pub text: String,
    pub statements: usize,
    pub transactional: bool,
}

impl Script {
    /// Wrap a script read from disk.
    #[must_use]
    pub fn from_text(text: String) -> Self {
        let lines = || {
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with("--"))
        };
        let transactional = lines().any(|l| l.eq_ignore_ascii_case("BEGIN;"));
        let statements = lines()
            .filter(|l| l.to_ascii_uppercase().starts_with("INSERT"))
            .count();

        Self {
            text,
            statements,
            transactional,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn insert() -> Statement {
        Statement::insert_event(
            "core_deposit_events",
            "0f6c1d5e-0000-4000-8000-000000000001",
            1,
            "Initialized",
            json!({"type": "initialized", "reference": "O'Brien"}),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid"),
        )
        .expect("valid statement")
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("'; DROP TABLE x; --"), "'''; DROP TABLE x; --'");
    }

    #[test]
    fn identifiers_must_be_snake_case() {
        assert!(validate_identifier("core_deposit_events").is_ok());
        assert!(validate_identifier("Core").is_err());
        assert!(validate_identifier("x; DROP").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LEN + 1)).is_err());
    }

    #[test]
    fn insert_binds_five_params() {
        let stmt = insert();

        assert_eq!(
            stmt.sql,
            "INSERT INTO core_deposit_events (id, sequence, event_type, event, recorded_at) \
             VALUES ($1, $2, $3, $4::jsonb, $5::timestamptz)"
        );
        assert_eq!(stmt.params.len(), 5);
        assert_eq!(stmt.params[1], SqlParam::Int(1));
    }

    #[test]
    fn render_inlines_quoted_literals() {
        let sql = insert().render().expect("render");

        assert!(sql.ends_with(
            "VALUES ('0f6c1d5e-0000-4000-8000-000000000001', 1, 'Initialized', \
             '{\"type\":\"initialized\",\"reference\":\"O''Brien\"}'::jsonb, \
             '2024-01-01T00:00:00Z'::timestamptz)"
        ));
    }

    #[test]
    fn render_rejects_unbound_placeholders() {
        let stmt = Statement {
            sql: "SELECT $1, $2".to_string(),
            params: vec![SqlParam::Int(1)],
        };

        assert!(matches!(
            stmt.render(),
            Err(StatementError::MissingParam { index: 2, count: 1 })
        ));
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let err = Statement::insert_event(
            "t",
            "id\0",
            1,
            "X",
            json!({}),
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, StatementError::NulByte { index: 1 }));
    }

    #[test]
    fn bound_form_keeps_values_out_of_sql() {
        let stmt = Statement::insert_event(
            "core_deposit_events",
            "x'); DROP TABLE core_deposit_events; --",
            2,
            "Initialized",
            json!({"memo": "line\\one\nline two"}),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid"),
        )
        .expect("valid statement");

        let bound = stmt.render_bound();
        let (sql, args) = bound.split_once(" \\bind ").expect("bind");

        assert_eq!(sql, stmt.sql);
        assert!(!bound.contains('\n'));
        assert_eq!(
            args,
            "'x''); DROP TABLE core_deposit_events; --' '2' 'Initialized' \
             '{\"memo\":\"line\\\\\\\\one\\\\nline two\"}' '2024-01-01T00:00:00Z' \\g"
        );
    }

    #[test]
    fn bind_args_escape_quotes_and_line_breaks() {
        assert_eq!(quote_bind_arg("O'Brien"), "'O''Brien'");
        assert_eq!(quote_bind_arg("a\\b"), "'a\\\\b'");
        assert_eq!(quote_bind_arg("a\nb\rc"), "'a\\nb\\rc'");
    }

    #[test]
    fn executor_script_binds_every_statement() {
        let mut batch = Batch::new();
        batch.header("Scenario: demo");
        batch.comment("Day 0");
        batch.push(insert());
        batch.push(insert());

        let script = batch.to_script().expect("script");

        assert!(!script.transactional);
        assert_eq!(script.statements, 2);
        assert!(script.text.starts_with("-- Day 0\nINSERT INTO core_deposit_events"));
        assert_eq!(script.text.matches(" \\bind ").count(), 2);
        assert_eq!(script.text.matches(" \\g\n").count(), 2);
        assert!(!script.text.contains("'O''Brien'"));
        assert!(script.text.contains("\"reference\":\"O''Brien\""));
    }

    #[test]
    fn script_wraps_in_transaction() {
        let mut batch = Batch::new();
        batch.header("Scenario: demo");
        batch.comment("Day 0");
        batch.push(insert());

        let script = batch.render_script().expect("render");
        assert!(script.starts_with("-- Scenario: demo\n\nBEGIN;\n\n-- Day 0\nINSERT INTO"));
        assert!(script.ends_with(";\n\nCOMMIT;\n"));

        let reread = Script::from_text(script);
        assert!(reread.transactional);
        assert_eq!(reread.statements, 1);
        assert!(!batch.to_script().expect("script").transactional);
    }
}
