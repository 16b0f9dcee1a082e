use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("base_url ="));
    assert!(contents.contains("[endpoints]"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_prefs_default_then_set() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["prefs", "get", "view_mode"])
        .assert()
        .success()
        .stdout(predicate::str::diff("overlay\n"));

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["prefs", "set", "last_section", "external_events"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last_section = external-events"));

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["prefs", "get", "last_section"])
        .assert()
        .success()
        .stdout(predicate::str::diff("external-events\n"));

    assert!(dir.path().join("preferences.toml").exists());
}

#[test]
fn test_prefs_rejects_unknown_values() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["prefs", "set", "view_mode", "grid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown view mode 'grid'"));

    cargo_bin_cmd!("byte")
        .env("BYTE_HOME", dir.path())
        .args(["prefs", "get", "theme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preference 'theme'"));
}
