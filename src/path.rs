//! Path manipulation utilities for repo-cache

/// Normalize a logical resource path.
///
/// Splits on `/`, drops empty, `.` and `..` segments, and joins the
/// remainder with a single `/`. The root path normalizes to the empty
/// string. Dropping `..` keeps every path inside its location.
pub fn normalize_path(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

/// Iterate over the non-empty segments of a logical path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Join a normalized parent path with a child name.
pub fn join_path(parent: &str, child: &str) -> String {
    let child = normalize_path(child);
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child,
        (false, true) => parent.to_string(),
        (false, false) => format!("{}/{}", parent, child),
    }
}

/// Encode a location URI into a single filesystem-safe directory name.
///
/// `/` becomes `-` and `:` becomes `_`. ASCII letters, digits and `.` are
/// kept, except a leading `.`. Every other byte, `-`, `_` and `%` included,
/// is percent-escaped, so two different URIs never share a directory.
pub fn encode_location_uri(uri: &str) -> String {
    let mut encoded = String::with_capacity(uri.len());
    for (i, c) in uri.chars().enumerate() {
        match c {
            '/' => encoded.push('-'),
            ':' => encoded.push('_'),
            '.' if i > 0 => encoded.push('.'),
            c if c.is_ascii_alphanumeric() => encoded.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    encoded.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    encoded
}
