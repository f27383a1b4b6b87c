use super::load_schema;
use crate::{Error, cli::SchemaArg};
use scenariogen_config::Config;
use scenariogen_schema::prelude::*;
use std::fmt::Write as _;

pub(super) fn list_events(config: &Config, args: &SchemaArg) -> Result<(), Error> {
    let schema = load_schema(config, args)?;

    for event in schema.events.values() {
        println!("\n{} -> {}", event.name, event.table_name);
        for variant in &event.variants {
            println!("{}", variant_line(variant));
        }
    }

    Ok(())
}

// variant_line
fn variant_line(variant: &EventVariant) -> String {
    let mut line = format!("  {}", variant.name);

    for (label, category) in [("flow", Category::FlowControl), ("amounts", Category::Amount)] {
        let names: Vec<_> = variant.fields_in(category).map(|f| f.name.as_str()).collect();
        if !names.is_empty() {
            let _ = write!(line, " {label}=[{}]", names.join(", "));
        }
    }

    line
}

///
/// TESTS
///
