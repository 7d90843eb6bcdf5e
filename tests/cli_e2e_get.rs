//! End-to-end tests for the `get` command
//!
//! These tests invoke the actual CLI binary and validate its behavior
//! from a user's perspective.

mod common;
use common::prelude::*;

/// Test that --help flag shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_help() {
    let mut cmd = cargo_bin_cmd!("repo-cache");

    cmd.arg("get")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Retrieve a path from a location or group",
        ));
}

/// Test that a mirror file is fetched through the group and printed
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_downloads_through_group() {
    let fixture = TestFixture::new()
        .with_standard_config()
        .with_mirror_file("org/foo/foo-1.0.pom", "<project>foo</project>");

    fixture
        .command()
        .args(["get", "public", "org/foo/foo-1.0.pom"])
        .assert()
        .success()
        .stdout(predicate::str::diff("<project>foo</project>"));

    assert_eq!(fixture.find_cached("org/foo/foo-1.0.pom").len(), 1);
}

/// Test that a second get is served from the cache once the mirror is gone
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_serves_cached_copy() {
    let fixture = TestFixture::new()
        .with_standard_config()
        .with_mirror_file("org/foo/foo.jar", "jar bytes");

    fixture
        .command()
        .args(["get", "public", "org/foo/foo.jar"])
        .assert()
        .success();

    std::fs::remove_file(fixture.mirror_dir().join("org/foo/foo.jar")).unwrap();

    fixture
        .command()
        .args(["get", "mirror", "org/foo/foo.jar"])
        .assert()
        .success()
        .stdout(predicate::str::diff("jar bytes"));
}

/// Test that --output writes the content to a file
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_to_output_file() {
    let fixture = TestFixture::new()
        .with_standard_config()
        .with_mirror_file("org/foo/foo.pom", "<project/>");
    let output = fixture.path().join("out.pom");

    fixture
        .command()
        .args(["get", "public", "org/foo/foo.pom", "--output"])
        .arg(&output)
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(output).unwrap(), "<project/>");
}

/// Test that --all lists each location holding the path in group order
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_all_lists_locations() {
    let fixture = TestFixture::new()
        .with_standard_config()
        .with_mirror_file("org/foo/foo.pom", "mirror")
        .with_file("upload.pom", "local");

    fixture
        .command()
        .args(["put", "local", "org/foo/foo.pom", "--file", "upload.pom"])
        .assert()
        .success();

    let output = fixture
        .command()
        .args(["get", "public", "org/foo/foo.pom", "--all"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("local\t"));
    assert!(lines[1].starts_with("mirror\t"));
}

/// Test that a missing path fails with a clear message
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_missing_path() {
    let fixture = TestFixture::new().with_standard_config();

    fixture
        .command()
        .args(["get", "public", "org/missing.pom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: org/missing.pom"));
}

/// Test that an unknown location name lists the known names
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_get_unknown_location() {
    let fixture = TestFixture::new().with_standard_config();

    fixture
        .command()
        .args(["get", "central", "org/foo.pom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown location 'central'"))
        .stderr(predicate::str::contains("local, mirror, public"));
}
