// Regression tests: the weft binary end to end.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn weft() -> Command {
    Command::cargo_bin("weft").unwrap()
}

#[test]
fn cli_evaluates_addition() {
    weft()
        .args(["eval", "4 + 5"])
        .assert()
        .success()
        .stdout(contains("Result: 9"));
}

#[test]
fn cli_puts_writes_to_stdout() {
    weft()
        .args(["eval", "puts(1, 4 + 5)"])
        .assert()
        .success()
        .stdout(contains("1\n9\n").and(contains("Result: [1, 9]")));
}

#[test]
fn cli_reports_unknown_function() {
    weft()
        .args(["eval", "shout(1)"])
        .assert()
        .failure()
        .stderr(contains("weft::eval::unknown_function"));
}

#[test]
fn cli_transforms_hash_from_stdin() {
    weft()
        .args(["parse", "--transform", "-"])
        .write_stdin(r#"{ hello: "world", hi: "there" }"#)
        .assert()
        .success()
        .stdout(contains(r#""hello": "world""#).and(contains(r#""hi": "there""#)));
}

#[test]
fn cli_prints_yaml_tree() {
    weft()
        .args(["parse", "--grammar", "expression", "--format", "yaml", "-"])
        .write_stdin("4 + 5")
        .assert()
        .success()
        .stdout(contains("left:").and(contains("op:")));
}

#[test]
fn cli_reports_parse_error() {
    weft()
        .args(["parse", "-"])
        .write_stdin("{ hello: }")
        .assert()
        .failure()
        .stderr(contains("weft::parse::unexpected_input"));
}

#[test]
fn cli_scans_document_file() {
    let file = "tests/scan_sample.md";
    fs::write(file, "intro\n:::>> foo(hello_there: 'world')\nbody\n").unwrap();

    weft()
        .args(["scan", file])
        .assert()
        .success()
        .stdout(contains("directive").and(contains("foo")).and(contains("text")));

    let _ = fs::remove_file(file);
}

#[test]
fn cli_reports_missing_file() {
    weft()
        .args(["scan", "tests/does_not_exist.md"])
        .assert()
        .failure()
        .stderr(contains("weft::io::io"));
}

#[test]
fn cli_lists_rules_with_root() {
    weft()
        .args(["rules", "expression"])
        .assert()
        .success()
        .stdout(contains("expression (root)").and(contains("funcall")));
}

#[test]
fn cli_lists_builtins() {
    weft()
        .arg("list-builtins")
        .assert()
        .success()
        .stdout(contains("puts"));
}

#[test]
fn cli_rejects_deeply_nested_sum() {
    let expr = format!("{}1", "1+".repeat(600));
    weft()
        .args(["eval", expr.as_str()])
        .assert()
        .code(1)
        .stderr(contains("weft::parse::nesting_limit"));
}
