use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn command(temp: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mailsift").expect("binary exists");
    cmd.env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.child("config").path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn scan_text_reports_counts_per_provider() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("--text")
        .arg("contact: alice@yahoo.com, alice@yahoo.com, bob@unknown.org")
        .assert()
        .success()
        .stdout(predicate::str::contains("Scan results"))
        .stdout(predicate::str::is_match(r"Yahoo\s+1 email").unwrap())
        .stdout(predicate::str::is_match(r"Others\s+1 email").unwrap())
        .stdout(predicate::str::contains("Total unique: 2"));
}

#[test]
fn scan_type_verbose_lists_only_that_provider() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("mixed.txt");
    input.write_str("Ann <ann@gmail.com>\nBen <ben@hotmail.com>\nann@GMAIL.com\n").unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("--type")
        .arg("gmail")
        .arg("--verbose")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ann@gmail.com"))
        .stdout(predicate::str::contains("ben@hotmail.com").not())
        .stdout(predicate::str::contains("Total unique: 1"));
}

#[test]
fn scan_reads_stdin_when_no_input_is_given() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("--json")
        .write_stdin("x@msn.com y@live.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outlook\": [\n    \"x@msn.com\"\n  ]"))
        .stdout(predicate::str::contains("\"hotmail\": [\n    \"y@live.com\"\n  ]"));
}

#[test]
fn scan_of_empty_input_warns_and_succeeds() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total unique: 0"))
        .stderr(predicate::str::contains("Warning: No text to scan."));
}

#[test]
fn scan_exports_each_requested_provider() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = temp.child("out");

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("-t")
        .arg("gmail")
        .arg("-t")
        .arg("others")
        .arg("--export")
        .arg("txt")
        .arg("--out-dir")
        .arg(out.path())
        .arg("--text")
        .arg("a@gmail.com q@yahoo.com z@corp.io")
        .assert()
        .success()
        .stderr(predicate::str::contains("gmail_emails.txt"));

    out.child("gmail_emails.txt").assert("a@gmail.com");
    out.child("others_emails.txt").assert("z@corp.io");
    out.child("yahoo_emails.txt").assert(predicates::path::missing());
}

#[test]
fn scan_export_all_writes_one_spreadsheet() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("--export")
        .arg("xlsx")
        .arg("--out-dir")
        .arg(temp.path())
        .arg("--text")
        .arg("a@gmail.com q@yahoo.com")
        .assert()
        .success();

    temp.child("all_emails.xlsx").assert(predicates::path::exists());
}

#[test]
fn scan_skips_known_addresses() {
    let temp = assert_fs::TempDir::new().unwrap();
    let known = temp.child("known.txt");
    known.write_str("a@gmail.com\n").unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg("--verbose")
        .arg("--known")
        .arg(known.path())
        .arg("--text")
        .arg("A@gmail.com b@gmail.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("b@gmail.com"))
        .stdout(predicate::str::contains("a@gmail.com").not())
        .stderr(predicate::str::contains("Skipped 1 already known address."));
}

#[test]
fn scan_rejects_unsupported_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("photo.png");
    input.write_binary(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn scan_rejects_files_over_the_configured_limit() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("config/mailsift/config.toml").write_str("max_file_bytes = 16\n").unwrap();
    let input = temp.child("list.txt");
    input.write_str("someone@gmail.com and more text").unwrap();

    command(&temp)
        .arg("scan")
        .arg("--no-copy")
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn scan_large_input_uses_background_worker() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("config/mailsift/config.toml")
        .write_str("large_input_threshold = 100\nchunk_size = 64\n")
        .unwrap();
    let input = temp.child("big.txt");
    let body: String = (0..200).map(|n| format!("row {n} person{n}@yahoo.com filler\n")).collect();
    input.write_str(&body).unwrap();

    command(&temp)
        .arg("--debug")
        .arg("scan")
        .arg("--no-copy")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Yahoo\s+200 emails").unwrap())
        .stderr(predicate::str::contains("Worker spawned"));
}

#[test]
fn scan_rejects_unknown_provider() {
    let temp = assert_fs::TempDir::new().unwrap();

    command(&temp)
        .arg("scan")
        .arg("--type")
        .arg("aol")
        .arg("--text")
        .arg("a@aol.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown provider 'aol'"));
}

#[test]
fn version_flag_works() {
    let temp = assert_fs::TempDir::new().unwrap();
    command(&temp).arg("--version").assert().success();
}
