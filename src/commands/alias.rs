//! # Alias Command Implementation
//!
//! This module implements the `alias` subcommand, which makes content
//! already cached under one location and path reachable under another.
//! Depending on `alias_linking` in the configuration, the alias is a hard
//! link or a copy.
//!
//! A group source resolves to the first member holding the path; a group
//! target resolves to the first member that accepts stores.

use anyhow::{anyhow, Result};
use clap::Args;

use repo_cache::resource::ConcreteResource;

use super::Context;

/// Make cached content reachable under a second location and path
#[derive(Args, Debug)]
pub struct AliasArgs {
    /// Location or group holding the content
    pub from_location: String,

    /// Path of the existing content
    pub from_path: String,

    /// Location or group receiving the alias
    pub to_location: String,

    /// Path of the alias
    pub to_path: String,
}

/// Execute the `alias` command.
pub fn execute(ctx: &Context, args: AliasArgs) -> Result<()> {
    let from_location = ctx.location(&args.from_location)?;
    let to_location = ctx.location(&args.to_location)?;

    let source = ctx
        .content
        .retrieve(&from_location, &args.from_path)?
        .ok_or_else(|| anyhow!("Not found: {} in {}", args.from_path, from_location))?;

    let target_candidates = ctx
        .content
        .expander()
        .expand_resource(std::slice::from_ref(&to_location), &args.to_path)?;
    let target: ConcreteResource = if to_location.is_group() {
        ctx.content
            .resolver()
            .select_storage_resource(&target_candidates)
            .ok_or_else(|| anyhow!("No location in {} accepts stores", to_location))?
    } else {
        ConcreteResource::new(to_location, &args.to_path)
    };

    ctx.manager.create_alias(source.resource(), &target)?;
    println!("{} -> {}", target, source.resource());
    Ok(())
}
