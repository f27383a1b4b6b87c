use scenariogen_config::{Config, Error};
use std::fs;

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenariogen.toml");
    fs::write(
        &path,
        "[execute]\ncredential_env = \"LANA_PG\"\npsql = \"/usr/bin/psql\"\n",
    )
    .expect("write");

    let config = Config::load_or_default(Some(path.as_path())).expect("load");

    assert_eq!(config.execute.credential_env, "LANA_PG");
    assert_eq!(config.execute.psql.to_str(), Some("/usr/bin/psql"));
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Config::load_or_default(Some(dir.path().join("absent.toml").as_path())).unwrap_err();

    assert!(matches!(err, Error::Read { .. }));
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[scan\n").expect("write");

    let err = Config::load(&path).unwrap_err();

    assert!(err.to_string().contains("broken.toml"));
}
