//! # Resource Addressing
//!
//! Two immutable value types address content in the cache:
//!
//! - **[`ConcreteResource`]**: a single `(Location, path)` pair. Paths are
//!   normalized on construction, so two resources with the same location and
//!   the same logical path are equal no matter how the path was spelled.
//! - **[`VirtualResource`]**: one path under an ordered list of locations.
//!   The order is the resolution priority and is preserved by
//!   [`VirtualResource::to_concrete_resources`].
//!
//! Neither type performs I/O.

use std::fmt;

use crate::error::{Error, Result};
use crate::location::Location;
use crate::path::{join_path, normalize_path, segments};

/// A path under one location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteResource {
    location: Location,
    path: String,
}

impl ConcreteResource {
    pub fn new(location: Location, path: &str) -> Self {
        Self {
            location,
            path: normalize_path(path),
        }
    }

    /// Builds a resource from individual path segments.
    pub fn from_segments(location: Location, parts: &[&str]) -> Self {
        let path = parts
            .iter()
            .fold(String::new(), |acc, part| join_path(&acc, part));
        Self { location, path }
    }

    /// The root of a location.
    pub fn root(location: Location) -> Self {
        Self {
            location,
            path: String::new(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The normalized path, empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        segments(&self.path)
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The last path segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The parent resource. The root is its own parent.
    pub fn parent(&self) -> ConcreteResource {
        match self.path.rfind('/') {
            Some(idx) => Self {
                location: self.location.clone(),
                path: self.path[..idx].to_string(),
            },
            None => Self::root(self.location.clone()),
        }
    }

    pub fn child(&self, name: &str) -> ConcreteResource {
        Self {
            location: self.location.clone(),
            path: join_path(&self.path, name),
        }
    }

    /// Appends `suffix` to the full path string rather than adding a segment,
    /// e.g. `a/b.jar` + `.sha1` is `a/b.jar.sha1`. Undefined on the root.
    pub fn with_suffix(&self, suffix: &str) -> Option<ConcreteResource> {
        if self.is_root() {
            return None;
        }
        Some(Self::new(
            self.location.clone(),
            &format!("{}{}", self.path, suffix),
        ))
    }
}

impl fmt::Display for ConcreteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}", self.location, self.path)
    }
}

/// A path resolved against an ordered list of locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualResource {
    locations: Vec<Location>,
    path: String,
}

impl VirtualResource {
    /// Creates a virtual resource. An empty location list is rejected.
    pub fn new(locations: Vec<Location>, path: &str) -> Result<Self> {
        if locations.is_empty() {
            return Err(Error::InvalidResource {
                message: format!("virtual resource '{}' has no locations", path),
            });
        }
        Ok(Self {
            locations,
            path: normalize_path(path),
        })
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// One concrete resource per location, in location order.
    pub fn to_concrete_resources(&self) -> Vec<ConcreteResource> {
        self.locations
            .iter()
            .map(|loc| ConcreteResource {
                location: loc.clone(),
                path: self.path.clone(),
            })
            .collect()
    }
}

impl fmt::Display for VirtualResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.locations.iter().map(|l| l.name()).collect();
        write!(f, "[{}]:/{}", names.join(", "), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn central() -> Location {
        Location::new("central", "https://repo1.example.com/maven2")
    }

    #[test]
    fn test_root() {
        let root = ConcreteResource::new(central(), "/");
        assert!(root.is_root());
        assert_eq!(root.path(), "");
        assert_eq!(root.file_name(), None);
        assert_eq!(root.parent(), root);
        assert_eq!(root.parent().parent(), root);
    }

    #[test]
    fn test_parent_and_child() {
        let r = ConcreteResource::new(central(), "org/foo/foo-1.0.jar");
        assert_eq!(r.parent().path(), "org/foo");
        assert_eq!(r.parent().parent().path(), "org");
        assert!(r.parent().parent().parent().is_root());
        assert_eq!(r.parent().child("foo-1.0.jar"), r);
        assert_eq!(r.file_name(), Some("foo-1.0.jar"));
    }

    #[test]
    fn test_path_spellings_are_equal() {
        let a = ConcreteResource::new(central(), "/org//foo/");
        let b = ConcreteResource::from_segments(central(), &["org", "foo"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_suffix() {
        let r = ConcreteResource::new(central(), "org/foo/foo-1.0.jar");
        let meta = r.with_suffix(".sha1").unwrap();
        assert_eq!(meta.path(), "org/foo/foo-1.0.jar.sha1");
        assert_eq!(meta.location(), r.location());
        assert!(ConcreteResource::root(central()).with_suffix(".sha1").is_none());
    }

    #[test]
    fn test_display() {
        let r = ConcreteResource::new(central(), "org/foo");
        assert_eq!(r.to_string(), "central:/org/foo");
    }

    #[test]
    fn test_virtual_rejects_empty_locations() {
        let result = VirtualResource::new(vec![], "org/foo");
        assert!(matches!(result, Err(Error::InvalidResource { .. })));
    }

    #[test]
    fn test_virtual_expansion_preserves_order() {
        let l1 = Location::new("local", "file:///srv/local");
        let l2 = central();
        let l3 = Location::new("snapshots", "https://snapshots.example.com");
        let virt =
            VirtualResource::new(vec![l1.clone(), l2.clone(), l3.clone()], "org/foo").unwrap();
        let concrete = virt.to_concrete_resources();
        assert_eq!(
            concrete,
            vec![
                ConcreteResource::new(l1, "org/foo"),
                ConcreteResource::new(l2, "org/foo"),
                ConcreteResource::new(l3, "org/foo"),
            ]
        );
    }
}
