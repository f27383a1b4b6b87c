use clap::Parser;
use scenariogen_cli::{Error, cli::Cli, run};
use scenariogen_core::scenario::Scenario;
use std::{fs, path::Path};

const ENTITY: &str = r#"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepositEvent {
    Initialized {
        id: DepositId,
        deposit_account_id: DepositAccountId,
        amount: UsdCents,
        reference: String,
    },
    Reverted {
        id: DepositId,
        status: DepositStatus,
    },
}

pub enum DepositStatus {
    Confirmed,
    Reverted,
}
"#;

const SCENARIO: &str = r"
scenario:
  name: deposit
inputs:
  deposit: 250000
base_time: 2024-02-01
seed: 11
timeline:
  - day: 1
    events:
      - type: DepositEvent::Initialized
        entity: d1
        params:
          amount: $inputs.deposit
          reference: first deposit
  - day: 4
    events:
      - type: DepositEvent::Reverted
        entity: d1
        params:
          status: Reverted
";

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("src/deposit");
        fs::create_dir_all(&src).expect("mkdir");
        fs::write(src.join("entity.rs"), ENTITY).expect("write entity");
        fs::write(dir.path().join("scenario.yml"), SCENARIO).expect("write scenario");
        fs::write(
            dir.path().join("scenariogen.toml"),
            "[execute]\ncredential_env = \"SCENARIOGEN_TEST_UNSET_PG\"\n",
        )
        .expect("write config");

        Self { dir }
    }

    fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).display().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<(), Error> {
        let config = self.path("scenariogen.toml");
        let argv = ["scenariogen", "--config", config.as_str()]
            .into_iter()
            .chain(args.iter().copied());

        run(Cli::try_parse_from(argv).expect("valid arguments"))
    }

    fn parse(&self) {
        self.run(&[
            "parse",
            &self.path("src"),
            "-o",
            &self.path("out/schema.json"),
            "--docs",
            &self.path("out/EVENTS.md"),
            "--template",
            &self.path("out/template.yml"),
        ])
        .expect("parse");
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).expect("read")
}

#[test]
fn parse_writes_schema_docs_and_template() {
    let ws = Workspace::new();
    ws.parse();

    assert!(read(ws.path("out/schema.json")).contains("core_deposit_events"));
    assert!(read(ws.path("out/EVENTS.md")).contains("### `DepositEvent`"));

    let template = read(ws.path("out/template.yml"));
    assert!(template.contains("#   - Reverted flow=[status]"));
    Scenario::from_yaml(&template).expect("template is a valid scenario");
}

#[test]
fn generate_writes_a_reproducible_script() {
    let ws = Workspace::new();
    ws.parse();

    let generate = |out: &str| {
        ws.run(&[
            "generate",
            &ws.path("scenario.yml"),
            "-s",
            &ws.path("out/schema.json"),
            "-o",
            &ws.path(out),
        ])
        .expect("generate");
        read(ws.path(out))
    };
    let sql = generate("out/a.sql");

    assert_eq!(sql, generate("out/b.sql"));
    assert!(sql.contains("BEGIN;"));
    assert!(sql.trim_end().ends_with("COMMIT;"));
    assert_eq!(sql.matches("INSERT INTO core_deposit_events").count(), 2);
    assert!(sql.contains("250000"));
    assert!(sql.contains("'2024-02-02T00:00:00Z'"));
}

#[test]
fn strict_mode_fails_on_unknown_references() {
    let ws = Workspace::new();
    ws.parse();
    fs::write(
        ws.path("broken.yml"),
        "timeline:\n  - day: 0\n    events:\n      - type: LoanEvent::Initialized\n",
    )
    .expect("write");

    let args = |strict: bool| {
        let mut args = vec![
            "generate".to_string(),
            ws.path("broken.yml"),
            "-s".to_string(),
            ws.path("out/schema.json"),
            "-o".to_string(),
            ws.path("out/broken.sql"),
        ];
        if strict {
            args.push("--strict".to_string());
        }
        args
    };
    let run = |args: Vec<String>| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        ws.run(&args)
    };

    assert!(matches!(run(args(true)), Err(Error::Strict(1))));
    assert!(!Path::new(&ws.path("out/broken.sql")).exists());

    run(args(false)).expect("lenient run still writes");
    assert!(read(ws.path("out/broken.sql")).contains("WARNING"));
}

#[test]
fn dry_runs_need_no_database() {
    let ws = Workspace::new();
    ws.parse();
    fs::write(ws.path("out/manual.sql"), "BEGIN;\nINSERT INTO t VALUES (1);\nCOMMIT;\n").expect("write");

    ws.run(&["run", &ws.path("out/manual.sql"), "--dry-run"])
        .expect("run dry");
    ws.run(&["apply", &ws.path("scenario.yml"), "-s", &ws.path("out/schema.json"), "--dry-run"])
        .expect("apply dry");
}

#[test]
fn missing_credential_is_reported() {
    let ws = Workspace::new();
    let err = ws.run(&["test-db"]).unwrap_err();

    assert!(err.to_string().contains("SCENARIOGEN_TEST_UNSET_PG"));
}
