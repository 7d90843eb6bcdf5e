//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use repo_cache::defaults::{CACHE_ROOT_ENV, DEFAULT_CONFIG_FILE};

use crate::commands::{self, Context};

/// Repository cache - resolve, store and alias artifacts across repository locations
#[derive(Parser, Debug)]
#[command(name = "repo-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the repo-cache.yaml configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// The root directory for cached content.
    ///
    /// Overrides `cache_root` from the configuration file. Defaults to the
    /// system cache directory (`~/.cache/repo-cache` on Linux).
    #[arg(long, global = true, value_name = "DIR", env = CACHE_ROOT_ENV)]
    cache_root: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve a path from a location or group
    Get(commands::get::GetArgs),

    /// Store content at the first writable location
    Put(commands::put::PutArgs),

    /// Delete a path from every location of a group
    Delete(commands::delete::DeleteArgs),

    /// List cached children of a path
    Ls(commands::ls::LsArgs),

    /// Make cached content reachable under a second location and path
    Alias(commands::alias::AliasArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        let ctx = Context::load(&self.config, self.cache_root)?;
        match self.command {
            Commands::Get(args) => commands::get::execute(&ctx, args),
            Commands::Put(args) => commands::put::execute(&ctx, args),
            Commands::Delete(args) => commands::delete::execute(&ctx, args),
            Commands::Ls(args) => commands::ls::execute(&ctx, args),
            Commands::Alias(args) => commands::alias::execute(&ctx, args),
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level '{}'", level))
}

fn init_logging(level: &str) -> Result<()> {
    let filter = parse_level(level)?;
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_timestamp(None)
        .try_init();
    Ok(())
}
