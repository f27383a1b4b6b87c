//! Starter scenario file listing every record the schema knows about.

use scenariogen_schema::prelude::*;
use std::fmt::Write as _;

///
/// render
///
/// A valid scenario (it parses and generates) followed by a commented
/// catalogue of records, variants and their flow-control and amount
/// fields.
///
#[must_use]
pub fn render(schema: &EventSchema) -> String {
    let mut out = String::new();

    out.push_str("# Scenario template, generated from the parsed schema.\n\n");
    out.push_str("scenario:\n  name: example_scenario\n  description: |\n    Describe what this scenario exercises\n\n");

    let example = schema
        .events
        .values()
        .find_map(|event| Some((event, event.variants.first()?)));
    let amounts: Vec<&str> = example
        .map(|(_, variant)| variant.fields_in(Category::Amount).map(|f| f.name.as_str()).collect())
        .unwrap_or_default();

    out.push_str("# External inputs, referenced as $inputs.<key>\ninputs:\n");
    if amounts.is_empty() {
        out.push_str("  amount: 0\n");
    }
    for name in &amounts {
        let _ = writeln!(out, "  {name}: 0");
    }

    out.push_str("\n# Customer attributes, referenced as $customer.<key>\ncustomer:\n");
    out.push_str("  email: test@example.com\n  telegram: test_user\n  type: individual\n\n");
    out.push_str("base_time: \"2024-01-01T00:00:00Z\"\nseed: 1\n\n");

    out.push_str("timeline:\n  - day: 0\n    events:\n");
    match example {
        Some((event, variant)) => {
            let _ = writeln!(out, "      - type: {}::{}", event.name, variant.name);
            out.push_str("        entity: main\n");
            if !amounts.is_empty() {
                out.push_str("        params:\n");
                for name in &amounts {
                    let _ = writeln!(out, "          {name}: $inputs.{name}");
                }
            }
        }
        None => out.push_str("      []\n"),
    }

    let _ = writeln!(out, "\n# Available events\n# {}", "-".repeat(50));
    for event in schema.events.values() {
        let _ = writeln!(out, "# {}:", event.name);
        for variant in &event.variants {
            let _ = writeln!(out, "#   - {}{}", variant.name, hint(variant));
        }
    }

    out
}

// hint
fn hint(variant: &EventVariant) -> String {
    let list = |category| {
        variant
            .fields_in(category)
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut hint = String::new();

    let flow = list(Category::FlowControl);
    if !flow.is_empty() {
        let _ = write!(hint, " flow=[{flow}]");
    }
    let amounts = list(Category::Amount);
    if !amounts.is_empty() {
        let _ = write!(hint, " amounts=[{amounts}]");
    }

    hint
}
