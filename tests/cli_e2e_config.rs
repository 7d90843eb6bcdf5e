//! End-to-end tests for configuration loading and global flags

mod common;
use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("repo-cache");

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("put"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("alias"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_missing_default_config() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["ls", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("repo-cache.yaml"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_explicit_config_path() {
    let fixture = TestFixture::new().with_file("conf/custom.yaml", configs::LOCAL_ONLY);

    fixture
        .command()
        .args(["--config", "conf/custom.yaml", "ls", "local"])
        .assert()
        .success();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_invalid_yaml() {
    let fixture = TestFixture::new().with_config(configs::INVALID_YAML);

    fixture
        .command()
        .args(["ls", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_unknown_group_member() {
    let fixture = TestFixture::new().with_config(configs::UNKNOWN_MEMBER);

    fixture
        .command()
        .args(["ls", "public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown member 'missing'"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cyclic_groups() {
    let fixture = TestFixture::new().with_config(configs::CYCLIC_GROUPS);

    fixture
        .command()
        .args(["ls", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cycle detected"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_invalid_log_level() {
    let fixture = TestFixture::new().with_config(configs::LOCAL_ONLY);

    fixture
        .command()
        .args(["--log-level", "loud", "ls", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level 'loud'"));
}

/// Test that info logging reports the storage event on stderr
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_debug_logging_goes_to_stderr() {
    let fixture = TestFixture::new().with_config(configs::LOCAL_ONLY);

    fixture
        .command()
        .args(["--log-level", "debug", "put", "local", "a.txt"])
        .write_stdin("x")
        .assert()
        .success()
        .stderr(predicate::str::contains("using cache root"));
}
