//! Integration tests for the read-error policy and order checking.
//!
//! A directory path opens fine on unix but fails on the first read, which
//! gives a source that breaks mid-merge.

use predicates::prelude::*;

use super::{log_file, logmerge};

#[cfg(unix)]
#[test]
fn fail_fast_is_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let a = log_file("1 a\n2 a\n");
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("read error"))
        .stdout("");
}

#[cfg(unix)]
#[test]
fn skip_policy_merges_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let a = log_file("1 a\n2 a\n");
    logmerge()
        .arg("--no-prefix")
        .args(["--on-error", "skip"])
        .arg(a.path())
        .arg(dir.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("read error"))
        .stdout("1 a\n2 a\n");
}

#[test]
fn out_of_order_input_is_not_fatal() {
    let a = log_file("5 a\n1 a-late\n");
    let b = log_file("3 b\n");
    logmerge()
        .arg("--no-prefix")
        .arg("--check-order")
        .arg(a.path())
        .arg(b.path())
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout("3 b\n5 a\n1 a-late\n")
        .stderr(predicate::str::contains("a-late").not().and(predicate::str::contains("line 2")));
}

#[test]
fn verbose_logs_to_stderr_only() {
    let a = log_file("1 a\n");
    let b = log_file("2 b\n");
    logmerge()
        .arg("--no-prefix")
        .arg("-v")
        .arg(a.path())
        .arg(b.path())
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout("1 a\n2 b\n")
        .stderr(predicate::str::contains("exhausted"));
}
