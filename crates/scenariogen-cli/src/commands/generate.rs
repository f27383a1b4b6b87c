use super::{load_schema, write_output};
use crate::{
    Error,
    cli::{GenerateArgs, SchemaArg},
};
use scenariogen_config::Config;
use scenariogen_core::prelude::*;
use std::path::Path;

///
/// Prepared
/// a generated batch, ready to render or execute
///

pub(super) struct Prepared {
    pub batch: Batch,
    pub diagnostics: usize,
}

// prepare
// scenario -> batch, enforcing strict mode before anything is written
pub(super) fn prepare(
    config: &Config,
    scenario_path: &Path,
    schema: &SchemaArg,
    strict: bool,
) -> Result<Prepared, Error> {
    let schema = load_schema(config, schema)?;
    let scenario = Scenario::load(scenario_path)?;
    let options = GenerateOptions {
        naming: config.naming.clone(),
        customer_entities: config.generate.customer_entities.clone(),
    };

    tracing::info!(scenario = %scenario_path.display(), "generating");
    let generation = Generator::new(&schema, &options).generate(&scenario)?;

    let diagnostics: Vec<_> = generation.diagnostics().collect();
    if !diagnostics.is_empty() {
        tracing::warn!(count = diagnostics.len(), "generation produced diagnostics");
        if strict || config.generate.strict {
            return Err(Error::Strict(diagnostics.len()));
        }
    }

    let batch = generation.to_batch(&scenario_path.display().to_string())?;

    Ok(Prepared {
        batch,
        diagnostics: diagnostics.len(),
    })
}

pub(super) fn generate(config: &Config, args: &GenerateArgs) -> Result<(), Error> {
    let prepared = prepare(config, &args.scenario, &args.schema, args.strict)?;
    let script = prepared.batch.render_script()?;

    if args.dry_run {
        print!("{script}");
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.sql_for(&args.scenario));
    write_output(&output, &script)?;
    println!(
        "SQL written to {} ({} statements, {} diagnostics)",
        output.display(),
        prepared.batch.statement_count(),
        prepared.diagnostics
    );

    Ok(())
}
