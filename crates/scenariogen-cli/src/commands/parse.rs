use super::write_output;
use crate::{Error, cli::ParseArgs, docs, template};
use scenariogen_config::Config;
use scenariogen_scan::{ScanRoot, Scanner};
use scenariogen_schema::prelude::*;

const SOURCE_WIDTH: usize = 40;

pub(super) fn parse(config: &Config, args: &ParseArgs) -> Result<(), Error> {
    let roots: Vec<ScanRoot> = if args.roots.is_empty() {
        config
            .scan
            .roots
            .iter()
            .map(|r| ScanRoot::new(&r.path, r.precedence))
            .collect()
    } else {
        args.roots.iter().map(|p| ScanRoot::new(p, 0)).collect()
    };

    let source_path = roots
        .iter()
        .map(|r| r.path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let scanner = Scanner::new(&config.naming, &config.scan.skip_markers);
    let ctx = SchemaContext {
        naming: &config.naming,
        classifier: Classifier::default(),
    };

    let (schema, skips) = scanner
        .scan(&roots)?
        .build_schema(ctx, Provenance::now(source_path));
    for skip in &skips {
        tracing::warn!(%skip, "skipped");
    }

    let output = args.output.as_deref().unwrap_or(&config.output.schema);
    let json = schema.to_json()?;
    write_output(output, &json)?;
    println!("schema written to {}", output.display());

    if !args.schema_only {
        let docs_path = args.docs.as_deref().unwrap_or(&config.output.docs);
        write_output(docs_path, &docs::render(&schema, &config.docs.phases))?;
        println!("docs written to {}", docs_path.display());

        let template_path = args.template.as_deref().unwrap_or(&config.output.template);
        write_output(template_path, &template::render(&schema))?;
        println!("template written to {}", template_path.display());
    }

    print_summary(&schema, skips.len());

    Ok(())
}

// print_summary
fn print_summary(schema: &EventSchema, skipped: usize) {
    let name_width = schema.events.keys().map(String::len).max().unwrap_or(0).max(10);
    let table_width = schema
        .events
        .values()
        .map(|e| e.table_name.len())
        .max()
        .unwrap_or(0)
        .max(5);

    println!();
    println!("{:<name_width$}  {:<table_width$}  {:>8}  Source", "Event Type", "Table", "Variants");
    for event in schema.events.values() {
        println!(
            "{:<name_width$}  {:<table_width$}  {:>8}  {}",
            event.name,
            event.table_name,
            event.variants.len(),
            truncate(&event.source_file, SOURCE_WIDTH)
        );
    }

    let stats = schema.stats();
    println!(
        "\n{} event records, {} variants, {} fields, {skipped} skipped",
        stats.events, stats.variants, stats.fields
    );
}

// truncate
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let head: String = s.chars().take(width).collect();

    format!("{head}...")
}

///
/// TESTS
///
