//! # Put Command Implementation
//!
//! This module implements the `put` subcommand, which stores content at a
//! path. When the location is a group, the content goes to the first member
//! that accepts stores; a group without one is an error.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use repo_cache::event::EventMetadata;

use super::Context;

/// Store content at the first writable location
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Location or group to store into
    pub location: String,

    /// Path of the artifact within the location
    pub path: String,

    /// Read the content from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the `put` command.
pub fn execute(ctx: &Context, args: PutArgs) -> Result<()> {
    let location = ctx.location(&args.location)?;

    let mut input: Box<dyn Read> = match &args.file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let metadata = EventMetadata::new().with("source", "cli");
    let transfer = ctx
        .content
        .store_with(&location, &args.path, &mut input, &metadata)
        .with_context(|| format!("Failed to store {} in {}", args.path, location))?;

    println!("Stored {} ({} bytes)", transfer, transfer.length());
    Ok(())
}
