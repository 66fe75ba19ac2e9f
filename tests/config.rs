use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;

use mailsift::config::{Config, config_file_path};

fn command() -> Command {
    Command::cargo_bin("mailsift").expect("binary exists")
}

#[test]
fn config_toggles_persist_to_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_root = temp.child("xdg-config");

    command()
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", config_root.path())
        .arg("config")
        .arg("--auto-copy")
        .arg("false")
        .arg("--auto-extract")
        .arg("false")
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto copy disabled."))
        .stdout(predicate::str::contains("Auto extract disabled."));

    let contents = fs::read_to_string(config_root.child("mailsift/config.toml").path()).unwrap();
    assert!(contents.contains("auto_copy = false"));
    assert!(contents.contains("auto_extract = false"));
    assert!(contents.contains("chunk_size = 5000"));

    command()
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", config_root.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"auto_copy\s+false").unwrap())
        .stdout(predicate::str::contains("mailsift/config.toml"));
}

#[test]
fn config_path_prints_location() {
    let temp = assert_fs::TempDir::new().unwrap();

    command()
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.child("xdg-config").path())
        .arg("config")
        .arg("--path")
        .assert()
        .success()
        .stdout(predicate::str::contains("mailsift/config.toml"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("xdg-config/mailsift/config.toml").write_str("chunk_size = 0\n").unwrap();

    command()
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.child("xdg-config").path())
        .arg("scan")
        .arg("--text")
        .arg("a@gmail.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_size must be greater than zero"));
}

#[test]
#[serial]
fn library_round_trips_config_through_xdg_home() {
    let temp = assert_fs::TempDir::new().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    // SAFETY: serialised with every other test that touches the environment.
    unsafe { std::env::set_var("XDG_CONFIG_HOME", temp.path()) };

    let config = Config { auto_copy: false, slice_size: 250, ..Config::default() };
    config.save().unwrap();
    assert_eq!(config_file_path().unwrap(), temp.path().join("mailsift").join("config.toml"));
    assert_eq!(Config::load().unwrap(), config);

    assert!(Config { slice_size: 0, ..Config::default() }.save().is_err());

    match previous {
        Some(value) => unsafe { std::env::set_var("XDG_CONFIG_HOME", value) },
        None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
    }
}
