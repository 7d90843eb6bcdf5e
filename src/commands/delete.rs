//! # Delete Command Implementation
//!
//! This module implements the `delete` subcommand, which removes a cached
//! path from a location or from every member of a group. Each location is
//! attempted even if an earlier one fails; the command reports every
//! outcome and exits with an error if any deletion failed.

use anyhow::{bail, Result};
use clap::Args;

use repo_cache::event::EventMetadata;
use repo_cache::resolver::DeleteOutcome;

use super::Context;

/// Delete a path from every location of a group
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Location or group to delete from
    pub location: String,

    /// Path of the artifact within the location
    pub path: String,
}

/// Execute the `delete` command.
pub fn execute(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let location = ctx.location(&args.location)?;
    let metadata = EventMetadata::new().with("source", "cli");
    let report = ctx.content.delete_report_with(
        std::slice::from_ref(&location),
        &args.path,
        &metadata,
    )?;

    for (resource, outcome) in report.outcomes() {
        match outcome {
            DeleteOutcome::Deleted => println!("deleted  {}", resource),
            DeleteOutcome::Absent => println!("absent   {}", resource),
            DeleteOutcome::Failed(message) => println!("failed   {}: {}", resource, message),
        }
    }

    if !report.all_succeeded() {
        bail!("Failed to delete {} from {}: {}", args.path, location, report);
    }
    Ok(())
}
