//! `scenariogen.toml` configuration.
//!
//! Every section is optional; a missing file means all defaults.

use scenariogen_schema::naming::TableNaming;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

pub const DEFAULT_CONFIG_FILE: &str = "scenariogen.toml";

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("cannot read config '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scan: ScanConfig,
    pub naming: TableNaming,
    pub generate: GenerateConfig,
    pub output: OutputConfig,
    pub execute: ExecuteConfig,
    pub docs: DocsConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Self::parse(text, Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&text, path)
    }

    ///
    /// load_or_default
    ///
    /// An explicit path must exist. Without one, `scenariogen.toml` in the
    /// working directory is used when present.
    ///
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    // parse
    fn parse(text: &str, path: &Path) -> Result<Self, Error> {
        let config: Self = toml::from_str(text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");

        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.naming.record_suffix.is_empty() {
            return Err(Error::Invalid("naming.record_suffix must not be empty".into()));
        }
        if let Some(root) = self.scan.roots.iter().find(|r| r.path.as_os_str().is_empty()) {
            return Err(Error::Invalid(format!(
                "scan root with precedence {} has an empty path",
                root.precedence
            )));
        }

        Ok(())
    }
}

///
/// ScanConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub roots: Vec<RootConfig>,
    pub skip_markers: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            skip_markers: vec!["Dummy".to_string(), "Test".to_string()],
        }
    }
}

///
/// RootConfig
/// higher precedence wins when two roots declare the same type
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub precedence: i32,
}

///
/// GenerateConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Entity types that get a `main` identity when a scenario sets a
    /// customer block.
    pub customer_entities: Vec<String>,

    /// Fail a run when any diagnostic was produced.
    pub strict: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            customer_entities: ["customer", "party", "deposit_account"]
                .map(String::from)
                .to_vec(),
            strict: false,
        }
    }
}

///
/// OutputConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub schema: PathBuf,
    pub docs: PathBuf,
    pub template: PathBuf,
    pub sql_dir: PathBuf,
}

impl OutputConfig {
    /// `<sql_dir>/<scenario stem>.sql`
    #[must_use]
    pub fn sql_for(&self, scenario: &Path) -> PathBuf {
        let stem = scenario.file_stem().unwrap_or(scenario.as_os_str());

        self.sql_dir.join(format!("{}.sql", stem.to_string_lossy()))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("output/schema.json"),
            docs: PathBuf::from("output/EVENTS.md"),
            template: PathBuf::from("output/scenario_template.yml"),
            sql_dir: PathBuf::from("output"),
        }
    }
}

///
/// ExecuteConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecuteConfig {
    /// Environment variable holding the connection string.
    pub credential_env: String,
    pub psql: PathBuf,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            credential_env: "PG_CON".to_string(),
            psql: PathBuf::from("psql"),
        }
    }
}

///
/// DocsConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub phases: Vec<Phase>,
}

///
/// Phase
/// named group of event records in the rendered reference
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    pub name: String,

    #[serde(default)]
    pub events: Vec<String>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config = Config::from_toml("").expect("parse");

        assert_eq!(config, Config::default());
        assert_eq!(config.execute.credential_env, "PG_CON");
        assert_eq!(config.scan.skip_markers, ["Dummy", "Test"]);
        assert_eq!(config.naming.table_name("DepositEvent"), "core_deposit_events");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
[scan]
roots = [{ path = "core", precedence = 10 }, { path = "lib" }]

[naming]
table_prefix = "app_"

[generate]
strict = true

[[docs.phases]]
name = "Onboarding"
events = ["CustomerEvent", "DepositAccountEvent"]
"#,
        )
        .expect("parse");

        assert_eq!(config.scan.roots.len(), 2);
        assert_eq!(config.scan.roots[1].precedence, 0);
        assert_eq!(config.naming.table_name("DepositEvent"), "app_deposit_events");
        assert!(config.generate.strict);
        assert_eq!(config.generate.customer_entities.len(), 3);
        assert_eq!(config.docs.phases[0].events[1], "DepositAccountEvent");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[generate]\nstrictly = true\n").unwrap_err();

        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn empty_record_suffix_is_invalid() {
        let err = Config::from_toml("[naming]\nrecord_suffix = \"\"\n").unwrap_err();

        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn sql_path_follows_scenario_stem() {
        let output = OutputConfig::default();

        assert_eq!(
            output.sql_for(Path::new("scenarios/facility.yml")),
            PathBuf::from("output/facility.sql")
        );
    }
}
