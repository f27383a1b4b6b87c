use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "scenariogen", version, about = "Event schema extraction and scenario fixture generation")]
pub struct Cli {
    /// Configuration file (default: ./scenariogen.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging, unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan source roots and write the schema artifact, docs and template
    Parse(ParseArgs),

    /// Generate a SQL script from a scenario
    Generate(GenerateArgs),

    /// Execute a SQL script against PostgreSQL
    Run(RunArgs),

    /// Generate a scenario and execute it in one step
    Apply(ApplyArgs),

    /// List event records and variants from a schema artifact
    ListEvents(SchemaArg),

    /// Check the database connection
    TestDb,
}

///
/// ParseArgs
///

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Source roots; overrides `scan.roots` from the config
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Schema artifact output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Markdown reference output
    #[arg(long, value_name = "FILE")]
    pub docs: Option<PathBuf>,

    /// Scenario template output
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Skip the markdown reference and the scenario template
    #[arg(long)]
    pub schema_only: bool,
}

///
/// SchemaArg
///

#[derive(Debug, Args)]
pub struct SchemaArg {
    /// Schema artifact written by `parse`
    #[arg(short = 's', long = "schema", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

///
/// GenerateArgs
///

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    #[command(flatten)]
    pub schema: SchemaArg,

    /// SQL output (default: `<output.sql_dir>/<scenario>.sql`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the script instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when any diagnostic is produced
    #[arg(long)]
    pub strict: bool,
}

///
/// RunArgs
///

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(value_name = "SQL")]
    pub sql: PathBuf,

    /// Print the script instead of executing it
    #[arg(long)]
    pub dry_run: bool,
}

///
/// ApplyArgs
///

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    #[command(flatten)]
    pub schema: SchemaArg,

    /// Generate and print without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when any diagnostic is produced
    #[arg(long)]
    pub strict: bool,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_with_global_options() {
        let cli = Cli::try_parse_from([
            "scenariogen",
            "generate",
            "scenarios/facility.yml",
            "-s",
            "out/schema.json",
            "--strict",
            "--config",
            "ci.toml",
        ])
        .expect("parse");

        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.schema.path, Some(PathBuf::from("out/schema.json")));
        assert!(args.strict);
        assert!(!args.dry_run);
    }

    #[test]
    fn list_events_and_test_db_use_kebab_case() {
        assert!(matches!(
            Cli::try_parse_from(["scenariogen", "list-events"]).map(|c| c.command),
            Ok(Command::ListEvents(_))
        ));
        assert!(matches!(
            Cli::try_parse_from(["scenariogen", "test-db", "-v"]).map(|c| (c.command, c.verbose)),
            Ok((Command::TestDb, true))
        ));
    }
}
