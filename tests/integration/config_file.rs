//! Integration tests for the TOML config file and CLI precedence.

use predicates::prelude::*;

use super::{log_file, logmerge};

#[test]
fn config_file_no_prefix_and_margin() {
    let config = log_file("no_prefix = true\nmargin = 1\n");
    let a = log_file(" 2 indented\n");
    let b = log_file("1 flush\n");
    logmerge()
        .arg(format!("--config={}", config.path().display()))
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("1 flush\n 2 indented\n");
}

#[test]
fn cli_margin_overrides_config_file() {
    let config = log_file("no_prefix = true\nmargin = 1\n");
    let a = log_file(" 2 indented\n");
    let b = log_file("1 flush\n");
    logmerge()
        .arg(format!("--config={}", config.path().display()))
        .args(["--margin", "0"])
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout(" 2 indented\n1 flush\n");
}

#[test]
fn config_file_custom_timestamp() {
    let config = log_file(
        r#"
no_prefix = true

[timestamp]
regex = '^<(\d+)>'
format = "%s"
"#,
    );
    let a = log_file("<1672912802> late\n");
    let b = log_file("2023-01-05 10:00:01 early\n");
    logmerge()
        .arg(format!("--config={}", config.path().display()))
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("2023-01-05 10:00:01 early\n<1672912802> late\n");
}

#[test]
fn config_file_palette() {
    let config = log_file("color = \"always\"\npalette = [\"33\"]\n");
    let a = log_file("1 a\n");
    let b = log_file("2 b\n");
    let output = logmerge()
        .arg(format!("--config={}", config.path().display()))
        .arg(a.path())
        .arg(b.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("\x1b[38;5;33m").count(), 2, "got: {stdout:?}");
}

#[test]
fn malformed_config_file() {
    let config = log_file("margin = \"wide\"\n");
    let a = log_file("1 a\n");
    let b = log_file("2 b\n");
    logmerge()
        .arg(format!("--config={}", config.path().display()))
        .arg(a.path())
        .arg(b.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config file error"));
}

#[test]
fn missing_explicit_config_file() {
    let a = log_file("1 a\n");
    let b = log_file("2 b\n");
    logmerge()
        .arg("--config=/nonexistent/logmerge.toml")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .failure()
        .code(1);
}
