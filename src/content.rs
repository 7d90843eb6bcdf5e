//! # Content Orchestration
//!
//! [`ContentManager`] is the entry point most callers want. It accepts
//! locations as the user names them, groups included, and plain path
//! strings. Each call expands the locations through a [`LocationExpander`]
//! and then runs the matching [`Resolver`] algorithm.
//!
//! Every operation that fires events has a `_with` variant taking
//! [`EventMetadata`]; the plain variant passes an empty one.

use std::io::Read;
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::event::EventMetadata;
use crate::expander::LocationExpander;
use crate::location::Location;
use crate::manager::TransferManager;
use crate::resolver::{DeleteReport, Resolver};
use crate::resource::VirtualResource;
use crate::transfer::Transfer;

/// Location-expanding front end over a transfer manager.
pub struct ContentManager {
    resolver: Resolver<dyn TransferManager>,
    expander: Arc<dyn LocationExpander>,
}

impl ContentManager {
    pub fn new(manager: Arc<dyn TransferManager>, expander: Arc<dyn LocationExpander>) -> Self {
        Self {
            resolver: Resolver::new(manager),
            expander,
        }
    }

    pub fn resolver(&self) -> &Resolver<dyn TransferManager> {
        &self.resolver
    }

    pub fn expander(&self) -> &Arc<dyn LocationExpander> {
        &self.expander
    }

    fn expand(&self, locations: &[Location], path: &str) -> Result<VirtualResource> {
        self.expander.expand_resource(locations, path)
    }

    pub fn retrieve(&self, location: &Location, path: &str) -> Result<Option<Transfer>> {
        self.retrieve_with(location, path, &EventMetadata::default())
    }

    /// The content at `path` in `location`, or in the first member holding
    /// it when `location` is a group.
    pub fn retrieve_with(
        &self,
        location: &Location,
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>> {
        self.retrieve_first_with(std::slice::from_ref(location), path, metadata)
    }

    pub fn retrieve_first(&self, locations: &[Location], path: &str) -> Result<Option<Transfer>> {
        self.retrieve_first_with(locations, path, &EventMetadata::default())
    }

    pub fn retrieve_first_with(
        &self,
        locations: &[Location],
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>> {
        let resource = self.expand(locations, path)?;
        self.resolver.retrieve_first(&resource, metadata)
    }

    pub fn retrieve_all(&self, locations: &[Location], path: &str) -> Result<Vec<Transfer>> {
        self.retrieve_all_with(locations, path, &EventMetadata::default())
    }

    pub fn retrieve_all_with(
        &self,
        locations: &[Location],
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<Vec<Transfer>> {
        let resource = self.expand(locations, path)?;
        self.resolver.retrieve_all(&resource, metadata)
    }

    pub fn delete(&self, location: &Location, path: &str) -> Result<bool> {
        self.delete_with(location, path, &EventMetadata::default())
    }

    /// Deletes `path` from `location`, or from every member of a group.
    /// Returns `Ok(false)` if any member failed to delete.
    pub fn delete_with(
        &self,
        location: &Location,
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<bool> {
        self.delete_all_with(std::slice::from_ref(location), path, metadata)
    }

    pub fn delete_all(&self, locations: &[Location], path: &str) -> Result<bool> {
        self.delete_all_with(locations, path, &EventMetadata::default())
    }

    pub fn delete_all_with(
        &self,
        locations: &[Location],
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<bool> {
        Ok(self
            .delete_report_with(locations, path, metadata)?
            .all_succeeded())
    }

    /// Like [`ContentManager::delete_all_with`], keeping per-location
    /// outcomes.
    pub fn delete_report_with(
        &self,
        locations: &[Location],
        path: &str,
        metadata: &EventMetadata,
    ) -> Result<DeleteReport> {
        let resource = self.expand(locations, path)?;
        Ok(self.resolver.delete_all_detailed(&resource, metadata))
    }

    pub fn store(&self, location: &Location, path: &str, content: &mut dyn Read) -> Result<Transfer> {
        self.store_with(location, path, content, &EventMetadata::default())
    }

    /// Stores `content` at the first location, after group expansion, that
    /// accepts stores.
    pub fn store_with(
        &self,
        location: &Location,
        path: &str,
        content: &mut dyn Read,
        metadata: &EventMetadata,
    ) -> Result<Transfer> {
        let resource = self.expand(std::slice::from_ref(location), path)?;
        self.resolver.store(&resource, content, metadata)
    }

    /// Publishes `content` through the transport of the first location,
    /// after group expansion, that accepts stores.
    pub fn publish(
        &self,
        location: &Location,
        path: &str,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool> {
        let resource = self.expand(std::slice::from_ref(location), path)?;
        let Some(target) = self.resolver.select_storage_resource(&resource) else {
            return Err(Error::NoStorageLocation {
                resource: resource.to_string(),
            });
        };
        debug!("publishing {} ({})", target, content_type);
        self.resolver
            .manager()
            .publish(&target, content, length, content_type)
    }

    /// Children of `path` in every expanded location, in location order.
    pub fn list(&self, location: &Location, path: &str) -> Result<Vec<(Location, Vec<String>)>> {
        let resource = self.expand(std::slice::from_ref(location), path)?;
        let manager = self.resolver.manager();
        resource
            .to_concrete_resources()
            .into_iter()
            .map(|concrete| {
                let names = manager.cache_reference(&concrete).list()?;
                Ok((concrete.location().clone(), names))
            })
            .collect()
    }
}
