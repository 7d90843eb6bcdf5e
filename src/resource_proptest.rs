//! Property-based tests for resource addressing.
//!
//! These tests use proptest to generate random paths and location lists and
//! verify that the addressing invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::location::Location;
    use crate::path::{encode_location_uri, normalize_path};
    use crate::resource::{ConcreteResource, VirtualResource};
    use proptest::prelude::*;

    fn location() -> Location {
        Location::new("central", "https://repo1.example.com/maven2")
    }

    // ============================================================================
    // ConcreteResource property tests
    // ============================================================================

    proptest! {
        /// Property: parent().child(last) reproduces any non-root resource
        #[test]
        fn parent_child_roundtrip(segs in prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 1..8)) {
            let segs: Vec<&str> = segs.iter().map(String::as_str).filter(|s| *s != "." && *s != "..").collect();
            prop_assume!(!segs.is_empty());
            let r = ConcreteResource::from_segments(location(), &segs);
            let last = r.file_name().unwrap().to_string();
            prop_assert_eq!(r.parent().child(&last), r);
        }

        /// Property: the root is its own parent, however many times we ask
        #[test]
        fn root_parent_is_idempotent(depth in 1usize..20, spelling in "/*") {
            let root = ConcreteResource::new(location(), &spelling);
            prop_assert!(root.is_root());
            let mut current = root.clone();
            for _ in 0..depth {
                current = current.parent();
            }
            prop_assert_eq!(current, root);
        }

        /// Property: repeated parent() always reaches the root in `depth` steps
        #[test]
        fn parent_chain_reaches_root(segs in prop::collection::vec("[a-z0-9]{1,8}", 1..10)) {
            let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
            let mut r = ConcreteResource::from_segments(location(), &segs);
            for _ in 0..segs.len() {
                prop_assert!(!r.is_root());
                r = r.parent();
            }
            prop_assert!(r.is_root());
        }

        /// Property: normalization is idempotent
        #[test]
        fn normalize_is_idempotent(path in "[a-z/.]{0,40}") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
            prop_assert!(!once.starts_with('/'));
            prop_assert!(!once.ends_with('/'));
            prop_assert!(!once.contains("//"));
        }
    }

    // ============================================================================
    // VirtualResource property tests
    // ============================================================================

    proptest! {
        /// Property: expansion yields one resource per location, in order
        #[test]
        fn virtual_expansion_preserves_order(
            names in prop::collection::vec("[a-z]{1,8}", 1..6),
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
        ) {
            let locations: Vec<Location> = names
                .iter()
                .enumerate()
                .map(|(i, n)| Location::new(n.clone(), format!("https://{}.example.com/{}", n, i)))
                .collect();
            let virt = VirtualResource::new(locations.clone(), &path).unwrap();
            let concrete = virt.to_concrete_resources();

            prop_assert_eq!(concrete.len(), locations.len());
            for (resource, loc) in concrete.iter().zip(locations.iter()) {
                prop_assert_eq!(resource.location(), loc);
                prop_assert_eq!(resource.path(), path.as_str());
            }
        }
    }

    // ============================================================================
    // encode_location_uri property tests
    // ============================================================================

    proptest! {
        /// Property: encoded location directories never contain separators
        #[test]
        fn encode_location_uri_never_produces_unsafe_chars(input in ".*") {
            let result = encode_location_uri(&input);
            let unsafe_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
            for ch in unsafe_chars {
                prop_assert!(!result.contains(ch));
            }
        }

        /// Property: distinct URIs never share a directory
        #[test]
        fn encode_location_uri_is_injective(a in ".*", b in ".*") {
            prop_assume!(a != b);
            prop_assert_ne!(encode_location_uri(&a), encode_location_uri(&b));
        }

        /// Property: separator lookalikes stay apart
        #[test]
        fn encode_location_uri_keeps_dash_and_slash_apart(
            head in "[a-z]{1,8}",
            tail in "[a-z]{1,8}",
        ) {
            let dashed = format!("file:///{}-{}", head, tail);
            let nested = format!("file:///{}/{}", head, tail);
            prop_assert_ne!(encode_location_uri(&dashed), encode_location_uri(&nested));
        }

        /// Property: an encoded name is never a special directory entry
        #[test]
        fn encode_location_uri_never_yields_dot_entries(input in "[./]{1,4}") {
            let result = encode_location_uri(&input);
            prop_assert_ne!(result.as_str(), ".");
            prop_assert_ne!(result.as_str(), "..");
        }
    }
}
