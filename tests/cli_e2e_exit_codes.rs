//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any fatal error reported by a command
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    cargo_bin_cmd!("native-deps").arg("--help").assert().code(0);
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    cargo_bin_cmd!("native-deps")
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("native-deps"));
}

#[test]
fn test_exit_code_success() {
    let fixture = TestFixture::new()
        .with_pom(poms::STANDARD)
        .with_jar(STANDARD_ENTRIES);

    fixture.run("fetch").arg("--no-clone").assert().code(0);
}

#[test]
fn test_exit_code_missing_pom() {
    let fixture = TestFixture::new();

    fixture
        .run("fetch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read project metadata"))
        .stderr(predicate::str::contains("--pom"));
}

#[test]
fn test_exit_code_missing_config_value() {
    let fixture = TestFixture::new().with_pom(poms::WITHOUT_CUDF_VERSION);

    fixture
        .run("fetch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--cudf-version"));
}

#[test]
fn test_exit_code_artifact_not_found() {
    let fixture = TestFixture::new().with_pom(poms::STANDARD);

    fixture
        .run("fetch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("locate step failed"));
}

#[test]
fn test_exit_code_corrupt_archive() {
    let fixture = TestFixture::new()
        .with_pom(poms::STANDARD)
        .with_file(&format!("m2/{JAR_PATH}"), "garbage");

    fixture
        .run("fetch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("extract step failed: Extraction failed"));
}

#[test]
fn test_exit_code_no_matching_entries() {
    let fixture = TestFixture::new()
        .with_pom(poms::STANDARD)
        .with_jar(&[("META-INF/MANIFEST.MF", "m")]);

    fixture
        .run("fetch")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No entries in"))
        .stderr(predicate::str::contains("different platform or version"));

    fixture
        .child("target/native-deps")
        .assert(predicate::path::missing());
}

#[test]
fn test_exit_code_invalid_glob() {
    let fixture = TestFixture::new()
        .with_pom(poms::STANDARD)
        .with_jar(STANDARD_ENTRIES);

    fixture
        .run("fetch")
        .arg("--no-clone")
        .arg("--pattern")
        .arg("lib[")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Glob pattern error"));
}

/// Exit code 2 is returned for an unknown subcommand.
#[test]
fn test_exit_code_usage_unknown_command() {
    cargo_bin_cmd!("native-deps")
        .arg("frobnicate")
        .assert()
        .code(2);
}

/// Exit code 2 is returned for an invalid --color value.
#[test]
fn test_exit_code_usage_invalid_color() {
    cargo_bin_cmd!("native-deps")
        .arg("--color")
        .arg("sometimes")
        .arg("clean")
        .assert()
        .code(2);
}
