use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn command(temp: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mailsift").expect("binary exists");
    cmd.env("HOME", temp.path()).env("XDG_CONFIG_HOME", temp.child("config").path());
    cmd
}

#[test]
fn paste_extracts_as_lines_arrive() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("paste")
        .arg("--no-copy")
        .arg("--verbose")
        .write_stdin("first a@gmail.com\nnothing here\nsecond b@yahoo.com\nagain A@gmail.com\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 email so far"))
        .stdout(predicate::str::contains("2 emails so far"))
        .stdout(predicate::str::contains("b@yahoo.com"))
        .stdout(predicate::str::contains("Total unique: 2"))
        .stderr(predicate::str::contains("Extracted 2 unique emails!"));
}

#[test]
fn paste_without_auto_extract_only_scans_at_the_end() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("config/mailsift/config.toml").write_str("auto_extract = false\n").unwrap();

    command(&temp)
        .arg("paste")
        .arg("--no-copy")
        .write_stdin("a@gmail.com\nb@gmail.com\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("so far").not())
        .stdout(predicate::str::contains("Total unique: 2"));
}
