//! Defaults shared by the library and the `repo-cache` binary.
//!
//! The cache root is chosen in this order: an explicit override (the
//! `--cache-root` flag or `REPO_CACHE_ROOT`), then `cache_root` from the
//! configuration file, then the platform cache directory.

use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory when `--config`
/// is not given.
pub const DEFAULT_CONFIG_FILE: &str = "repo-cache.yaml";

/// Environment variable overriding the cache root.
pub const CACHE_ROOT_ENV: &str = "REPO_CACHE_ROOT";

/// Directory name used under the platform cache directory.
const CACHE_DIR_NAME: &str = "repo-cache";

/// The platform cache directory for repo-cache, e.g. `~/.cache/repo-cache`
/// on Linux or `~/Library/Caches/repo-cache` on macOS. Falls back to a
/// relative `.repo-cache` when the platform has no cache directory.
pub fn default_cache_root() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join(CACHE_DIR_NAME),
        None => PathBuf::from(format!(".{}", CACHE_DIR_NAME)),
    }
}

/// Picks the cache root from an explicit override, the configured root and
/// the platform default, in that order.
pub fn resolve_cache_root(overridden: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    overridden
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(default_cache_root)
}
