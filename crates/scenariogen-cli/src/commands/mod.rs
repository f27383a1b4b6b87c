//! Subcommand implementations.

mod execute;
mod generate;
mod list;
mod parse;

use crate::{
    Error,
    cli::{Cli, Command, SchemaArg},
};
use scenariogen_config::Config;
use scenariogen_schema::schema::EventSchema;
use std::{fs, path::Path};

///
/// run
///
/// Load the config and dispatch one subcommand.
///
pub fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Parse(args) => parse::parse(&config, &args),
        Command::Generate(args) => generate::generate(&config, &args),
        Command::Run(args) => execute::run_sql(&config, &args),
        Command::Apply(args) => execute::apply(&config, &args),
        Command::ListEvents(args) => list::list_events(&config, &args),
        Command::TestDb => execute::test_db(&config),
    }
}

// load_schema
fn load_schema(config: &Config, arg: &SchemaArg) -> Result<EventSchema, Error> {
    let path = arg.path.as_deref().unwrap_or(&config.output.schema);
    tracing::info!(path = %path.display(), "loading schema");

    Ok(EventSchema::load(path)?)
}

// write_output
// creates missing parent directories
fn write_output(path: &Path, contents: &str) -> Result<(), Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}
