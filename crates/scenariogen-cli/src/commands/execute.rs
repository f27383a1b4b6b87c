use super::{generate::prepare, write_output};
use crate::{
    Error,
    cli::{ApplyArgs, RunArgs},
};
use scenariogen_config::Config;
use scenariogen_core::prelude::*;
use std::fs;

pub(super) fn run_sql(config: &Config, args: &RunArgs) -> Result<(), Error> {
    let text = fs::read_to_string(&args.sql).map_err(|source| Error::Io {
        path: args.sql.clone(),
        source,
    })?;
    let script = Script::from_text(text);

    if args.dry_run {
        print!("{}", script.text);
        let report = DryRunExecutor.execute(&Credential::new(""), &script)?;
        println!("dry run: {} statements, nothing executed", report.statements);
        return Ok(());
    }

    let report = execute(config, &script)?;
    println!(
        "executed {} statements, {} rows affected",
        report.statements, report.rows_affected
    );

    Ok(())
}

pub(super) fn apply(config: &Config, args: &ApplyArgs) -> Result<(), Error> {
    let prepared = prepare(config, &args.scenario, &args.schema, args.strict)?;
    let rendered = prepared.batch.render_script()?;

    if args.dry_run {
        print!("{rendered}");
        println!("-- dry run: {} statements, nothing executed", prepared.batch.statement_count());
        return Ok(());
    }

    // keep the applied script on disk alongside `generate` output
    let output = config.output.sql_for(&args.scenario);
    write_output(&output, &rendered)?;

    let report = execute(config, &prepared.batch.to_script()?)?;
    println!(
        "scenario applied: {} statements, {} rows affected ({})",
        report.statements,
        report.rows_affected,
        output.display()
    );

    Ok(())
}

pub(super) fn test_db(config: &Config) -> Result<(), Error> {
    let credential = Credential::from_env(&config.execute.credential_env)?;
    PsqlExecutor::new(&config.execute.psql).ping(&credential)?;
    println!("connection successful");

    Ok(())
}

// execute
// connection check first, then the whole script in one transaction
fn execute(config: &Config, script: &Script) -> Result<ExecutionReport, Error> {
    let credential = Credential::from_env(&config.execute.credential_env)?;
    let executor = PsqlExecutor::new(&config.execute.psql);

    tracing::info!("testing database connection");
    executor.ping(&credential)?;

    Ok(executor.execute(&credential, script)?)
}
