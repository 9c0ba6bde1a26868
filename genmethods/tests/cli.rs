use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const USAGE: &str = "usage: genmethods [package path]";

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("genmethods").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn shapes_package() -> (TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let package = root.path().join("shapes");
    fs::create_dir(&package).unwrap();
    fs::write(
        package.join("mod.rs"),
        "mod method_gen;\n\npub struct Square { pub side: f64 }\npub struct Circle(pub f64);\npub const ORIGIN: (f64, f64) = (0.0, 0.0);\n",
    )
    .unwrap();
    (root, package)
}

#[test]
fn no_arguments_prints_usage() {
    cmd().assert().success().stdout(contains(USAGE));
}

#[test]
fn extra_arguments_print_usage() {
    cmd().args(["one", "two"]).assert().success().stdout(contains(USAGE));
}

#[test]
fn generates_and_reports_targets() {
    let (_root, package) = shapes_package();

    cmd()
        .arg("--no-color")
        .arg(&package)
        .assert()
        .success()
        .stdout(contains("target"))
        .stdout(contains("Circle"))
        .stdout(contains("Square"))
        .stdout(contains("wrote:").and(contains("method_gen.rs")));

    let content = fs::read_to_string(package.join("method_gen.rs")).unwrap();
    assert!(content.contains("impl Circle {"));
    assert!(content.contains("impl Square {"));
    assert!(!content.contains("ORIGIN"));
}

#[test]
fn quiet_prints_nothing_on_success() {
    let (_root, package) = shapes_package();

    cmd()
        .args(["--quiet", "--no-color"])
        .arg(&package)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(package.join("method_gen.rs").exists());
}

#[test]
fn verbose_lists_declarations() {
    let (_root, package) = shapes_package();

    cmd()
        .args(["--verbose", "--no-color"])
        .arg(&package)
        .assert()
        .success()
        .stderr(contains("ORIGIN"));
}

#[test]
fn missing_package_reports_error() {
    let root = tempfile::tempdir().unwrap();
    let package = root.path().join("absent");

    cmd()
        .arg("--no-color")
        .arg(&package)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("does not exist")));

    assert!(!package.exists());
}

#[test]
fn syntax_error_reports_error_and_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let package = root.path().join("broken");
    fs::create_dir(&package).unwrap();
    fs::write(package.join("lib.rs"), "pub struct Broken {\n").unwrap();

    cmd()
        .arg("--no-color")
        .arg(&package)
        .assert()
        .failure()
        .stderr(contains("error:"));

    assert!(!package.join("method_gen.rs").exists());
}
