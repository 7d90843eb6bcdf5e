//! # Location Expansion
//!
//! Callers name locations loosely: a single repository, or a group that
//! aggregates several. Before any [`VirtualResource`] is built, a
//! [`LocationExpander`] replaces every group with its ordered members so the
//! resolver only ever sees concrete repositories.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::location::Location;
use crate::resource::VirtualResource;

/// Maps locations, possibly groups, to the ordered locations they stand for.
pub trait LocationExpander: Send + Sync {
    fn expand(&self, locations: &[Location]) -> Result<Vec<Location>>;

    /// A virtual resource over the expanded locations, keeping the path.
    fn expand_resource(&self, locations: &[Location], path: &str) -> Result<VirtualResource> {
        VirtualResource::new(self.expand(locations)?, path)
    }
}

/// Returns locations unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityExpander;

impl LocationExpander for IdentityExpander {
    fn expand(&self, locations: &[Location]) -> Result<Vec<Location>> {
        Ok(locations.to_vec())
    }
}

/// Expands group locations into their members, recursively.
///
/// Members keep their declared order, nested groups are expanded in place,
/// and a location reachable more than once is kept only at its first
/// position.
#[derive(Debug, Default, Clone)]
pub struct GroupLocationExpander {
    groups: HashMap<String, Vec<Location>>,
}

impl GroupLocationExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, name: impl Into<String>, members: Vec<Location>) -> Self {
        self.add_group(name, members);
        self
    }

    pub fn add_group(&mut self, name: impl Into<String>, members: Vec<Location>) {
        self.groups.insert(name.into(), members);
    }

    pub fn members(&self, group: &str) -> Option<&[Location]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    fn expand_into(
        &self,
        location: &Location,
        path: &mut Vec<String>,
        seen: &mut HashSet<Location>,
        out: &mut Vec<Location>,
    ) -> Result<()> {
        if !location.is_group() {
            if seen.insert(location.clone()) {
                out.push(location.clone());
            }
            return Ok(());
        }

        let name = location.name();
        if path.iter().any(|p| p == name) {
            let mut cycle = path.clone();
            cycle.push(name.to_string());
            return Err(Error::CycleDetected {
                cycle: cycle.join(" -> "),
            });
        }
        let members = self.groups.get(name).ok_or_else(|| Error::InvalidResource {
            message: format!("unknown location group '{}'", name),
        })?;

        path.push(name.to_string());
        for member in members {
            self.expand_into(member, path, seen, out)?;
        }
        path.pop();
        Ok(())
    }
}

impl LocationExpander for GroupLocationExpander {
    fn expand(&self, locations: &[Location]) -> Result<Vec<Location>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for location in locations {
            self.expand_into(location, &mut Vec::new(), &mut seen, &mut out)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str) -> Location {
        Location::new(name, format!("file:///srv/{}", name))
    }

    fn names(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(Location::name).collect()
    }

    #[test]
    fn test_identity() {
        let expanded = IdentityExpander
            .expand(&[loc("a"), Location::group("g")])
            .unwrap();
        assert_eq!(names(&expanded), vec!["a", "g"]);
    }

    #[test]
    fn test_group_expands_in_member_order() {
        let expander =
            GroupLocationExpander::new().with_group("public", vec![loc("local"), loc("central")]);
        let expanded = expander
            .expand(&[Location::group("public"), loc("snapshots")])
            .unwrap();
        assert_eq!(names(&expanded), vec!["local", "central", "snapshots"]);
    }

    #[test]
    fn test_nested_groups_and_dedup() {
        let expander = GroupLocationExpander::new()
            .with_group("inner", vec![loc("b"), loc("c")])
            .with_group("outer", vec![loc("a"), Location::group("inner"), loc("b")]);
        let expanded = expander
            .expand(&[Location::group("outer"), loc("a"), loc("d")])
            .unwrap();
        assert_eq!(names(&expanded), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_same_group_twice_is_not_a_cycle() {
        let expander = GroupLocationExpander::new()
            .with_group("inner", vec![loc("x")])
            .with_group(
                "outer",
                vec![Location::group("inner"), Location::group("inner")],
            );
        let expanded = expander.expand(&[Location::group("outer")]).unwrap();
        assert_eq!(names(&expanded), vec!["x"]);
    }

    #[test]
    fn test_cycle_detected() {
        let expander = GroupLocationExpander::new()
            .with_group("a", vec![Location::group("b")])
            .with_group("b", vec![loc("x"), Location::group("a")]);
        match expander.expand(&[Location::group("a")]) {
            Err(Error::CycleDetected { cycle }) => assert_eq!(cycle, "a -> b -> a"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_group() {
        let expander = GroupLocationExpander::new();
        assert!(matches!(
            expander.expand(&[Location::group("missing")]),
            Err(Error::InvalidResource { .. })
        ));
    }

    #[test]
    fn test_expand_resource() {
        let expander = GroupLocationExpander::new().with_group("g", vec![loc("a"), loc("b")]);
        let vr = expander
            .expand_resource(&[Location::group("g")], "org/foo.pom")
            .unwrap();
        assert_eq!(vr.to_string(), "[a, b]:/org/foo.pom");

        let empty = GroupLocationExpander::new().with_group("empty", Vec::new());
        assert!(empty
            .expand_resource(&[Location::group("empty")], "p")
            .is_err());
    }
}
