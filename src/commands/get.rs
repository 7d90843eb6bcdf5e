//! # Get Command Implementation
//!
//! This module implements the `get` subcommand, which resolves a path
//! against a location or group and writes the content of the first match to
//! stdout or a file. With `--all`, it instead lists every location holding
//! the path, in resolution order.
//!
//! Content missing from the cache is fetched from locations that allow
//! downloading before the command gives up.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;

use super::Context;

/// Retrieve a path from a location or group
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Location or group to resolve against
    pub location: String,

    /// Path of the artifact within the location
    pub path: String,

    /// List every location holding the path instead of printing content
    #[arg(long)]
    pub all: bool,

    /// Write the content to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `get` command.
pub fn execute(ctx: &Context, args: GetArgs) -> Result<()> {
    let location = ctx.location(&args.location)?;

    if args.all {
        let found = ctx
            .content
            .retrieve_all(std::slice::from_ref(&location), &args.path)?;
        if found.is_empty() {
            return Err(anyhow!("Not found: {} in {}", args.path, location));
        }
        for transfer in &found {
            println!("{}\t{}", transfer.location(), transfer.full_path());
        }
        return Ok(());
    }

    let transfer = ctx
        .content
        .retrieve(&location, &args.path)?
        .ok_or_else(|| anyhow!("Not found: {} in {}", args.path, location))?;
    let mut reader = transfer
        .open_input_stream(true)?
        .ok_or_else(|| anyhow!("{} is not a file", transfer))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            io::copy(&mut reader, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            io::copy(&mut reader, &mut out)?;
            out.flush()?;
        }
    }
    reader.close();
    Ok(())
}
