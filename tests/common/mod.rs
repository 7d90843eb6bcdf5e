//! Fixtures shared by the CLI end-to-end tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_standard_config();
//!     fixture.command().args(["get", "public", "a.pom"]).assert();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Everything a CLI test file usually imports.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// `repo-cache.yaml` snippets.
#[allow(dead_code)]
pub mod configs {
    /// A single writable location and nothing else.
    pub const LOCAL_ONLY: &str = r#"
locations:
  - name: local
    uri: file:///srv/local
    allows_stores: true
    allows_downloading: false
"#;

    /// A group naming a member that does not exist.
    pub const UNKNOWN_MEMBER: &str = r#"
locations:
  - name: local
    uri: file:///srv/local
groups:
  - name: public
    members: [local, missing]
"#;

    /// Two groups that contain each other.
    pub const CYCLIC_GROUPS: &str = r#"
locations:
  - name: local
    uri: file:///srv/local
groups:
  - name: a
    members: [local, b]
  - name: b
    members: [a]
"#;

    /// Not YAML at all.
    pub const INVALID_YAML: &str = "locations: [: nope";

    /// Standard layout with `{mirror}` standing in for the mirror's URI.
    pub const STANDARD_TEMPLATE: &str = r#"
locations:
  - name: local
    uri: file:///srv/local
    allows_stores: true
    allows_downloading: false
  - name: mirror
    uri: {mirror}
groups:
  - name: public
    members: [local, mirror]
"#;
}

/// A test fixture that provides a temporary directory holding a
/// `repo-cache.yaml`, a cache root and a mirror directory.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_standard_config()
///     .with_mirror_file("org/foo/foo.pom", "<project/>");
///
/// fixture
///     .command()
///     .args(["get", "public", "org/foo/foo.pom"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// An empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `repo-cache.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("repo-cache.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add the standard `local`, `mirror` and `public` configuration, with
    /// the mirror backed by this fixture's `mirror/` directory.
    pub fn with_standard_config(self) -> Self {
        let mirror = self.mirror_dir();
        std::fs::create_dir_all(&mirror).expect("Failed to create mirror directory");
        let uri = url::Url::from_directory_path(&mirror).expect("Mirror path is absolute");
        let yaml = configs::STANDARD_TEMPLATE.replace("{mirror}", uri.as_str());
        self.with_config(&yaml)
    }

    /// Place a file in the mirror's backing directory.
    #[allow(dead_code)]
    pub fn with_mirror_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("mirror")
            .child(path)
            .write_str(content)
            .expect("Failed to write mirror file");
        self
    }

    /// Writes `content` to `path` inside the fixture.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// The fixture directory, used as the working directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where `with_config` writes `repo-cache.yaml`.
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("repo-cache.yaml")
    }

    /// Get the path to the cache root.
    pub fn cache_root(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Get the path to the mirror's backing directory.
    pub fn mirror_dir(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    /// Find a cached file by its path within a location, wherever the
    /// location's directory under the cache root is.
    #[allow(dead_code)]
    pub fn find_cached(&self, path: &str) -> Vec<PathBuf> {
        let root = self.cache_root();
        let Ok(entries) = std::fs::read_dir(&root) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path().join(path))
            .filter(|p| p.is_file())
            .collect()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory with its cache
    /// root. The config is picked up as `repo-cache.yaml` in the current
    /// directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-cache");
        cmd.current_dir(self.path())
            .env_remove("REPO_CACHE_ROOT")
            .arg("--cache-root")
            .arg(self.cache_root());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_standard_config() {
        let fixture = TestFixture::new().with_standard_config();
        let content = std::fs::read_to_string(fixture.config_path()).unwrap();
        assert!(content.contains("file://"));
        assert!(!content.contains("{mirror}"));
        assert!(fixture.mirror_dir().is_dir());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        let configs = [
            configs::LOCAL_ONLY,
            configs::UNKNOWN_MEMBER,
            configs::CYCLIC_GROUPS,
        ];

        for config in configs {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
