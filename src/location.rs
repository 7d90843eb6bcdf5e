//! Repository locations.
//!
//! A [`Location`] identifies one repository endpoint: a local cache, a
//! mirror, a remote repository, or a group aggregating other locations.
//! Locations are compared and hashed by URI only, so two values that name
//! the same endpoint are interchangeable regardless of their other
//! attributes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// URI scheme used for group locations.
pub const GROUP_SCHEME: &str = "group";

fn default_true() -> bool {
    true
}

/// An addressable repository endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    name: String,
    uri: String,
    /// Informational priority. Resolution always follows the order the
    /// caller supplies; this value is never used to reorder locations.
    #[serde(default)]
    priority: i32,
    /// Whether new content may be stored at this location.
    #[serde(default)]
    allows_stores: bool,
    /// Whether missing content may be fetched into this location.
    #[serde(default = "default_true")]
    allows_downloading: bool,
}

impl Location {
    /// Creates a read-only location with downloading enabled.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            priority: 0,
            allows_stores: false,
            allows_downloading: true,
        }
    }

    /// Creates the location representing a named group.
    pub fn group(name: impl Into<String>) -> Self {
        let name = name.into();
        let uri = format!("{}:{}", GROUP_SCHEME, name);
        Self::new(name, uri).with_downloading(false)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_stores(mut self, allows_stores: bool) -> Self {
        self.allows_stores = allows_stores;
        self
    }

    pub fn with_downloading(mut self, allows_downloading: bool) -> Self {
        self.allows_downloading = allows_downloading;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this location is eligible to receive writes.
    pub fn allows_stores(&self) -> bool {
        self.allows_stores
    }

    pub fn allows_downloading(&self) -> bool {
        self.allows_downloading
    }

    /// Whether this location stands for a group of other locations.
    pub fn is_group(&self) -> bool {
        self.uri
            .strip_prefix(GROUP_SCHEME)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
