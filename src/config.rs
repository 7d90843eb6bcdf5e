//! # Configuration
//!
//! This module defines the `repo-cache.yaml` configuration file and the
//! logic for parsing and validating it.
//!
//! ## Format
//!
//! ```yaml
//! cache_root: /var/cache/repo-cache
//! alias_linking: true
//! locations:
//!   - name: local
//!     uri: file:///srv/local
//!     allows_stores: true
//!   - name: central
//!     uri: https://repo1.example.com/maven2
//! groups:
//!   - name: public
//!     members: [local, central]
//! ```
//!
//! Every field is optional. Group members may name locations or other
//! groups; their order is the resolution order.
//!
//! ## Validation
//!
//! [`parse`] rejects duplicate or empty names, URIs that do not parse, group
//! members that name nothing, and groups that contain themselves.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expander::{GroupLocationExpander, LocationExpander};
use crate::location::Location;

/// A named, ordered list of locations and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Parsed `repo-cache.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where cached content lives. Overridden by `--cache-root`.
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    /// Hard-link aliases instead of copying them.
    #[serde(default)]
    pub alias_linking: bool,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Config {
    /// Resolves a location or group by name. A group becomes a group
    /// location, which never accepts stores itself.
    pub fn location(&self, name: &str) -> Option<Location> {
        if let Some(location) = self.locations.iter().find(|l| l.name() == name) {
            return Some(location.clone());
        }
        self.groups
            .iter()
            .any(|g| g.name == name)
            .then(|| Location::group(name))
    }

    /// Names of every location and group, locations first.
    pub fn names(&self) -> Vec<&str> {
        self.locations
            .iter()
            .map(Location::name)
            .chain(self.groups.iter().map(|g| g.name.as_str()))
            .collect()
    }

    /// An expander knowing every configured group.
    pub fn expander(&self) -> GroupLocationExpander {
        let mut expander = GroupLocationExpander::new();
        for group in &self.groups {
            let members = group
                .members
                .iter()
                .filter_map(|member| self.location(member))
                .collect();
            expander.add_group(group.name.clone(), members);
        }
        expander
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.names() {
            if name.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: "location and group names must not be empty".to_string(),
                    hint: None,
                });
            }
            if !seen.insert(name) {
                return Err(Error::ConfigParse {
                    message: format!("duplicate location or group name '{}'", name),
                    hint: Some("Names are shared between locations and groups".to_string()),
                });
            }
        }

        for location in &self.locations {
            url::Url::parse(location.uri()).map_err(|e| Error::ConfigParse {
                message: format!(
                    "invalid uri '{}' for location '{}': {}",
                    location.uri(),
                    location.name(),
                    e
                ),
                hint: Some("Use an absolute URI such as file:///srv/repo".to_string()),
            })?;
        }

        for group in &self.groups {
            if let Some(unknown) = group.members.iter().find(|m| !seen.contains(m.as_str())) {
                return Err(Error::ConfigParse {
                    message: format!(
                        "group '{}' references unknown member '{}'",
                        group.name, unknown
                    ),
                    hint: Some(format!("Known names: {}", self.names().join(", "))),
                });
            }
        }

        let expander = self.expander();
        for group in &self.groups {
            expander.expand(&[Location::group(group.name.as_str())])?;
        }
        Ok(())
    }
}

/// Parses and validates a YAML configuration.
pub fn parse(yaml_content: &str) -> Result<Config> {
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml_content)?;
    config.validate()?;
    Ok(config)
}

/// Parses a configuration from a YAML file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
