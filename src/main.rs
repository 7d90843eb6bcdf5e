//! # Repository Cache CLI
//!
//! This is the binary entry point for the `repo-cache` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger at the requested level.
//! - Executing the appropriate command and translating library errors into
//!   user-friendly output.
//!
//! The core logic lives in the `repo_cache` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
