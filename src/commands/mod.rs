//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-cache` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared [`Context`] and the parsed
//!   `Args` and performs the command's logic.
//!
//! [`Context`] is built once per invocation from the configuration file and
//! the global flags. It owns the filesystem cache, the transfer manager and
//! the content manager every command works through.

pub mod alias;
pub mod delete;
pub mod get;
pub mod ls;
pub mod put;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use log::debug;

use repo_cache::cache::FileCacheProvider;
use repo_cache::config::{self, Config};
use repo_cache::content::ContentManager;
use repo_cache::defaults::resolve_cache_root;
use repo_cache::event::LoggingEventManager;
use repo_cache::location::Location;
use repo_cache::manager::CacheTransferManager;
use repo_cache::transport::FileTransport;

/// Everything a command needs, built from configuration and global flags.
pub struct Context {
    pub config: Config,
    pub provider: Arc<FileCacheProvider>,
    pub manager: Arc<CacheTransferManager>,
    pub content: ContentManager,
}

impl Context {
    /// Loads the configuration file and wires the cache under the chosen
    /// root. `cache_root` wins over the configuration's `cache_root`, which
    /// wins over the platform default.
    pub fn load(config_path: &Path, cache_root: Option<PathBuf>) -> Result<Self> {
        if !config_path.exists() {
            return Err(anyhow!(
                "Configuration file not found: {}\n  hint: pass --config or create {}",
                config_path.display(),
                repo_cache::defaults::DEFAULT_CONFIG_FILE
            ));
        }
        let config = config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
        Ok(Self::from_config(config, cache_root))
    }

    pub fn from_config(config: Config, cache_root: Option<PathBuf>) -> Self {
        let root = resolve_cache_root(cache_root, config.cache_root.as_deref());
        debug!("using cache root {}", root.display());

        let provider = Arc::new(FileCacheProvider::new(root, config.alias_linking));
        let manager = Arc::new(
            CacheTransferManager::new(provider.clone())
                .with_events(Arc::new(LoggingEventManager))
                .with_transport(Arc::new(FileTransport::new())),
        );
        let content = ContentManager::new(manager.clone(), Arc::new(config.expander()));
        Self {
            config,
            provider,
            manager,
            content,
        }
    }

    /// Resolves a location or group by name.
    pub fn location(&self, name: &str) -> Result<Location> {
        self.config.location(name).ok_or_else(|| {
            anyhow!(
                "Unknown location '{}'. Known locations: {}",
                name,
                self.config.names().join(", ")
            )
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::TestEnv;
    use super::*;

    #[test]
    fn test_load_missing_config() {
        let result = Context::load(Path::new("/nonexistent/repo-cache.yaml"), None);
        let message = result.err().unwrap().to_string();
        assert!(message.contains("Configuration file not found"));
    }

    #[test]
    fn test_cache_root_precedence() {
        let config = config::parse("cache_root: /from/config\n").unwrap();
        let ctx = Context::from_config(config.clone(), Some(PathBuf::from("/from/flag")));
        assert_eq!(ctx.provider.root(), Path::new("/from/flag"));

        let ctx = Context::from_config(config, None);
        assert_eq!(ctx.provider.root(), Path::new("/from/config"));
    }

    #[test]
    fn test_unknown_location_lists_known_names() {
        let env = TestEnv::new();
        let message = env.ctx.location("nope").err().unwrap().to_string();
        assert!(message.contains("local, mirror, public"));
        assert!(env.ctx.location("public").unwrap().is_group());
    }
}
