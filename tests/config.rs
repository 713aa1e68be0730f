use std::fs;

use checklist::config::{Config, CONFIG_FILE};
use checklist::error::Error;

#[test]
fn missing_sections_use_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[display]\ntitle = \"Chores\"\n").expect("write config");

    let cfg = Config::load(&path).expect("load config");
    assert_eq!(cfg.display.title, "Chores");
    assert_eq!(cfg.display.placeholder, "New task");
    assert_eq!(cfg.storage.key, "tasks");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[storage\nkey = ").expect("write config");

    let err = Config::load(&path).expect_err("parse error");
    assert!(matches!(err, Error::TomlParse(_)));

    let (cfg, err) = Config::load_reporting(&path);
    assert!(err.is_some());
    assert_eq!(cfg.storage.key, "tasks");
}

#[test]
fn zero_lock_timeout_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[storage]\nlock_timeout_ms = 0\n").expect("write config");

    let err = Config::load(&path).expect_err("invalid config");
    assert!(err.to_string().contains("lock_timeout_ms"));
}

#[test]
fn invalid_config_is_reported_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[storage]\nkey = \"a/b\"\n").expect("write config");

    let (cfg, err) = Config::load_reporting(&path);
    assert!(matches!(err, Some(Error::InvalidConfig(_))));
    assert_eq!(cfg.storage.key, "tasks");
}
