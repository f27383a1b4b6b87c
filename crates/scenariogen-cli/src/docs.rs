//! Markdown reference for an event schema.

use scenariogen_config::Phase;
use scenariogen_schema::prelude::*;
use std::{collections::BTreeSet, fmt::Write as _};

const OTHER_EVENTS: &str = "Other Events";

///
/// render
///
/// Records named in a phase are listed under it in phase order; everything
/// else goes under "Other Events", sorted by name. The timestamp is the
/// schema's parse time.
///
#[must_use]
pub fn render(schema: &EventSchema, phases: &[Phase]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Event Schema Reference\n");
    let _ = writeln!(
        out,
        "*Parsed {} from `{}`*\n",
        schema.parsed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        schema.source_path
    );
    legend(&mut out);

    let mut placed = BTreeSet::new();
    for phase in phases {
        let events: Vec<_> = phase
            .events
            .iter()
            .filter_map(|name| schema.event(name))
            .filter(|event| placed.insert(event.name.as_str()))
            .collect();
        section(&mut out, &phase.name, &events);
    }

    // BTreeMap iteration is already sorted
    let others: Vec<_> = schema
        .events
        .values()
        .filter(|event| !placed.contains(event.name.as_str()))
        .collect();
    section(&mut out, OTHER_EVENTS, &others);

    let stats = schema.stats();
    let _ = writeln!(out, "---\n\n## Summary Statistics\n");
    let _ = writeln!(out, "- **Event records:** {}", stats.events);
    let _ = writeln!(out, "- **Variants:** {}", stats.variants);
    let _ = writeln!(out, "- **Fields:** {}", stats.fields);
    let _ = writeln!(out, "- **Known types:** {}", stats.types);
    for (category, count) in &stats.by_category {
        let _ = writeln!(out, "- `{category}`: {count}");
    }

    out
}

// legend
fn legend(out: &mut String) {
    out.push_str("## Field Categories\n\n");
    out.push_str("| Category | Meaning | Example |\n");
    out.push_str("|----------|---------|---------|\n");
    for category in Category::ALL {
        let (meaning, example) = match category {
            Category::Identity => ("generated identifier, skip in scenarios", "`id`"),
            Category::FlowControl => ("drives scenario logic", "`status`, `approved`"),
            Category::Amount => ("monetary or quantity input", "`amount`"),
            Category::Temporal => ("timeline driven", "`due_date`"),
            Category::Reference => ("foreign key, tracked", "`customer_id`"),
            Category::Config => ("configuration input", "`terms`"),
            Category::Metadata => ("optional description", "`name`, `email`"),
        };
        let _ = writeln!(out, "| {} | {meaning} | {example} |", styled(category, &category.to_string()));
    }
    out.push_str("\n---\n\n");
}

// section
fn section(out: &mut String, title: &str, events: &[&EventEnum]) {
    if events.is_empty() {
        return;
    }

    let _ = writeln!(out, "## {title}\n");
    for event in events {
        record(out, event);
    }
}

// record
fn record(out: &mut String, event: &EventEnum) {
    let _ = writeln!(out, "### `{}`\n", event.name);
    let _ = writeln!(out, "**Table:** `{}`\n", event.table_name);
    if !event.source_file.is_empty() {
        let _ = writeln!(out, "**Source:** `{}`\n", event.source_file);
    }

    for variant in &event.variants {
        let _ = writeln!(out, "#### `{}`\n", variant.name);
        if variant.fields.is_empty() {
            out.push_str("*(no fields)*\n\n");
            continue;
        }

        out.push_str("| Field | Type | Category |\n");
        out.push_str("|-------|------|----------|\n");
        for field in &variant.fields {
            let ty = if field.optional {
                format!("Option<{}>", field.ty)
            } else {
                field.ty.clone()
            };
            let _ = writeln!(
                out,
                "| {} | `{ty}` | {} |",
                styled(field.category, &field.name),
                field.category
            );
        }
        out.push('\n');
    }
}

// styled
// scenario inputs in bold, generated and descriptive fields struck out
fn styled(category: Category, text: &str) -> String {
    match category {
        Category::Identity | Category::Metadata => format!("~~{text}~~"),
        Category::Reference => text.to_string(),
        _ => format!("**{text}**"),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> EventSchema {
        let naming = TableNaming::default();
        let ctx = SchemaContext {
            naming: &naming,
            classifier: Classifier::default(),
        };
        let record = |name: &str| {
            RawEventEnum::new(
                name,
                vec![
                    RawEventVariant::new(
                        "Initialized",
                        vec![
                            RawField::new("id", "Uuid"),
                            RawField::new("amount", "UsdCents"),
                            RawField::new("memo", "Option<String>"),
                        ],
                    ),
                    RawEventVariant::new("Closed", vec![]),
                ],
            )
        };

        EventSchema::build(
            TypeRegistry::new(),
            ["WithdrawalEvent", "DepositEvent", "AuditEvent"].map(record),
            ctx,
            Provenance::now("core"),
        )
    }

    #[test]
    fn phases_come_first_then_sorted_others() {
        let phases = [Phase {
            name: "Deposits".to_string(),
            events: vec!["WithdrawalEvent".to_string(), "MissingEvent".to_string()],
        }];
        let doc = render(&schema(), &phases);

        let at = |needle: &str| doc.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(at("## Deposits") < at("### `WithdrawalEvent`"));
        assert!(at("### `WithdrawalEvent`") < at("## Other Events"));
        assert!(at("## Other Events") < at("### `AuditEvent`"));
        assert!(at("### `AuditEvent`") < at("### `DepositEvent`"));
        assert!(!doc.contains("MissingEvent"));
    }

    #[test]
    fn field_rows_show_category_and_optionality() {
        let doc = render(&schema(), &[]);

        assert!(doc.contains("| ~~id~~ | `Uuid` | identity |"));
        assert!(doc.contains("| **amount** | `UsdCents` | amount |"));
        assert!(doc.contains("| ~~memo~~ | `Option<String>` | metadata |"));
        assert!(doc.contains("*(no fields)*"));
        assert!(doc.contains("- **Variants:** 6"));
    }
}
