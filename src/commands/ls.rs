//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists what the cache
//! holds under a path for a location, or for every member of a group.
//!
//! ## Functionality
//!
//! - **Direct children** (default): the names directly under the path.
//! - **Recursive** (`--recursive`): every stored file beneath the path.
//!
//! This command is read-only; it never fetches missing content.

use anyhow::Result;
use clap::Args;

use repo_cache::resource::ConcreteResource;

use super::Context;

/// List cached children of a path
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Location or group to list
    pub location: String,

    /// Path to list, the location root when omitted
    #[arg(default_value = "")]
    pub path: String,

    /// List every stored file beneath the path
    #[arg(short, long)]
    pub recursive: bool,
}

/// Execute the `ls` command.
pub fn execute(ctx: &Context, args: LsArgs) -> Result<()> {
    let location = ctx.location(&args.location)?;

    if args.recursive {
        let resource = ctx
            .content
            .expander()
            .expand_resource(std::slice::from_ref(&location), &args.path)?;
        for concrete in resource.to_concrete_resources() {
            print_section(&concrete, &ctx.provider.walk(&concrete)?);
        }
        return Ok(());
    }

    for (member, names) in ctx.content.list(&location, &args.path)? {
        print_section(&ConcreteResource::new(member, &args.path), &names);
    }
    Ok(())
}

fn print_section(resource: &ConcreteResource, entries: &[String]) {
    println!("{}", resource);
    if entries.is_empty() {
        println!("  (empty)");
    }
    for entry in entries {
        println!("  {}", entry);
    }
}
