//! Integration tests for ordering, grouping and tagging.

use predicates::prelude::*;

use super::{log_file, logmerge};

#[test]
fn merges_two_files_in_time_order() {
    let a = log_file("2023-01-05 10:00:00.100 a1\n2023-01-05 10:00:00.300 a2\n");
    let b = log_file("2023-01-05 10:00:00,200 b1\n2023-01-05 10:00:00,400 b2\n");
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout(
            "2023-01-05 10:00:00.100 a1\n\
             2023-01-05 10:00:00,200 b1\n\
             2023-01-05 10:00:00.300 a2\n\
             2023-01-05 10:00:00,400 b2\n",
        );
}

#[test]
fn automatic_log_tags() {
    let a = log_file("1 first\n");
    let b = log_file("2 second\n");
    logmerge()
        .arg("--color=never")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("log1 1 first\nlog2 2 second\n");
}

#[test]
fn explicit_prefixes_tag_first_line_only() {
    let a = log_file("2 boom\n  at main.rs:10\n");
    let b = log_file("1 hello\n");
    logmerge()
        .arg("--color=never")
        .arg(a.path())
        .arg(b.path())
        .args(["--prefix", "[APP]", "[DB]"])
        .assert()
        .success()
        .stdout("[DB] 1 hello\n[APP] 2 boom\n  at main.rs:10\n");
}

#[test]
fn equal_timestamps_keep_argument_order() {
    let a = log_file("5 a1\n");
    let b = log_file("5 b1\n");
    for _ in 0..5 {
        logmerge()
            .arg("--no-prefix")
            .arg(b.path())
            .arg(a.path())
            .assert()
            .success()
            .stdout("5 b1\n5 a1\n");
    }
}

#[test]
fn three_sources_total_order() {
    let x = log_file("1 x\n3 x\n5 x\n");
    let y = log_file("2 y\n4 y\n6 y\n");
    let z = log_file("0 z\n7 z\n");
    logmerge()
        .arg("--no-prefix")
        .arg(x.path())
        .arg(y.path())
        .arg(z.path())
        .assert()
        .success()
        .stdout("0 z\n1 x\n2 y\n3 x\n4 y\n5 x\n6 y\n7 z\n");
}

#[test]
fn leading_untimestamped_lines_come_first() {
    let a = log_file("0 epoch start\n");
    let b = log_file("=== banner ===\nbuild 42\n1 ready\n");
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("=== banner ===\nbuild 42\n0 epoch start\n1 ready\n");
}

#[test]
fn stdin_as_a_source() {
    let a = log_file("2 from file\n");
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg("-")
        .write_stdin("1 from stdin\n3 stdin again\n")
        .assert()
        .success()
        .stdout("1 from stdin\n2 from file\n3 stdin again\n");
}

#[test]
fn stdin_twice_is_rejected() {
    logmerge()
        .args(["-", "-"])
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stdin"));
}

#[test]
fn single_file_is_rejected() {
    let a = log_file("1 x\n");
    logmerge().arg(a.path()).assert().failure().code(2);
}

#[test]
fn missing_file_reports_path() {
    let a = log_file("1 x\n");
    logmerge()
        .arg(a.path())
        .arg("/nonexistent/logmerge/missing.log")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.log"));
}

#[test]
fn custom_regex_and_format() {
    let access = log_file("[05/Jan/2023:10:00:01] GET /\n[05/Jan/2023:10:00:03] GET /x\n");
    let app = log_file("2023-01-05 10:00:02 app\n");
    logmerge()
        .arg("--no-prefix")
        .args(["--regex", r"\[(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2})\]"])
        .args(["--format", "%d/%b/%Y:%H:%M:%S"])
        .arg(access.path())
        .arg(app.path())
        .assert()
        .success()
        .stdout(
            "[05/Jan/2023:10:00:01] GET /\n\
             2023-01-05 10:00:02 app\n\
             [05/Jan/2023:10:00:03] GET /x\n",
        );
}

#[test]
fn custom_format_without_year_interleaves() {
    let auth = log_file("Jan 15 10:00:01 host sshd: accepted\nJan 15 10:00:03 host sshd: closed\n");
    let cron = log_file("Jan 15 10:00:02 host cron: run\n");
    logmerge()
        .arg("--no-prefix")
        .args(["--regex", r"(\w{3} \d{2} \d{2}:\d{2}:\d{2})"])
        .args(["--format", "%b %d %H:%M:%S"])
        .arg(auth.path())
        .arg(cron.path())
        .assert()
        .success()
        .stdout(
            "Jan 15 10:00:01 host sshd: accepted\n\
             Jan 15 10:00:02 host cron: run\n\
             Jan 15 10:00:03 host sshd: closed\n",
        );
}

#[test]
fn regex_without_format_is_rejected() {
    let a = log_file("1 x\n");
    let b = log_file("2 y\n");
    logmerge()
        .args(["--regex", "(x)"])
        .arg(a.path())
        .arg(b.path())
        .assert()
        .failure()
        .code(2);
}

#[test]
fn margin_allows_indented_timestamps() {
    let a = log_file("  2 indented\n");
    let b = log_file("1 flush\n");

    // Without a margin the indented line is a leading continuation block
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("  2 indented\n1 flush\n");

    logmerge()
        .arg("--no-prefix")
        .args(["--margin", "2"])
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("1 flush\n  2 indented\n");
}

#[test]
fn missing_trailing_newline_is_terminated() {
    let a = log_file("1 a");
    let b = log_file("2 b\n");
    logmerge()
        .arg("--no-prefix")
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout("1 a\n2 b\n");
}

#[test]
fn empty_files_produce_no_output() {
    let a = log_file("");
    let b = log_file("");
    logmerge().arg(a.path()).arg(b.path()).assert().success().stdout("");
}
