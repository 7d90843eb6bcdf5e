//! # Multi-Location Resolution
//!
//! The [`Resolver`] runs the algorithms that operate over a
//! [`VirtualResource`]: the same path looked up in several locations.
//!
//! Locations are always visited in the order the caller supplied them. That
//! order decides which content wins when several locations hold different
//! bytes for the same path, so nothing here reorders, parallelises or
//! short-circuits differently based on location priority.
//!
//! | Operation | On a per-location error |
//! |---|---|
//! | `retrieve_first` | logged and skipped; reported only if nothing was found |
//! | `retrieve_all` | returned immediately |
//! | `delete_all` | recorded; remaining locations are still attempted |

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::event::EventMetadata;
use crate::manager::TransferManager;
use crate::resource::{ConcreteResource, VirtualResource};
use crate::transfer::Transfer;

/// What happened at one location during [`Resolver::delete_all_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing was stored there.
    Absent,
    Failed(String),
}

/// Per-location outcomes of a delete across a virtual resource, in location
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    outcomes: Vec<(ConcreteResource, DeleteOutcome)>,
}

impl DeleteReport {
    pub fn outcomes(&self) -> &[(ConcreteResource, DeleteOutcome)] {
        &self.outcomes
    }

    /// True when no attempted deletion failed. Absent resources count as
    /// success.
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ConcreteResource, &str)> {
        self.outcomes.iter().filter_map(|(r, o)| match o {
            DeleteOutcome::Failed(message) => Some((r, message.as_str())),
            _ => None,
        })
    }

    pub fn deleted(&self) -> impl Iterator<Item = &ConcreteResource> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == DeleteOutcome::Deleted)
            .map(|(r, _)| r)
    }
}

impl fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(
            f,
            "{} deleted, {} failed of {} locations",
            self.deleted().count(),
            failed,
            self.outcomes.len()
        )
    }
}

/// Multi-location algorithms over a transfer manager.
pub struct Resolver<M: ?Sized> {
    manager: Arc<M>,
}

impl<M: ?Sized> Clone for Resolver<M> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: TransferManager + ?Sized> Resolver<M> {
    pub fn new(manager: Arc<M>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<M> {
        &self.manager
    }

    /// The first location, in order, whose content is available.
    ///
    /// A failing location is logged and skipped. If no location has the
    /// content and at least one failed, the first failure is returned rather
    /// than a plain miss.
    pub fn retrieve_first(
        &self,
        resource: &VirtualResource,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>> {
        let mut first_error: Option<Error> = None;
        for concrete in resource.to_concrete_resources() {
            match self.manager.retrieve(&concrete, metadata) {
                Ok(Some(transfer)) => return Ok(Some(transfer)),
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to retrieve {}, trying next location: {}", concrete, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Every location holding the content, in location order.
    pub fn retrieve_all(
        &self,
        resource: &VirtualResource,
        metadata: &EventMetadata,
    ) -> Result<Vec<Transfer>> {
        let mut found = Vec::new();
        for concrete in resource.to_concrete_resources() {
            if let Some(transfer) = self.manager.retrieve(&concrete, metadata)? {
                found.push(transfer);
            }
        }
        Ok(found)
    }

    /// Deletes the path at every location. Returns `true` only if every
    /// attempted deletion succeeded.
    pub fn delete_all(&self, resource: &VirtualResource, metadata: &EventMetadata) -> bool {
        self.delete_all_detailed(resource, metadata).all_succeeded()
    }

    /// Deletes the path at every location, continuing past failures, and
    /// reports what happened at each.
    pub fn delete_all_detailed(
        &self,
        resource: &VirtualResource,
        metadata: &EventMetadata,
    ) -> DeleteReport {
        let mut report = DeleteReport::default();
        for concrete in resource.to_concrete_resources() {
            let outcome = match self.manager.delete(&concrete, metadata) {
                Ok(true) => DeleteOutcome::Deleted,
                Ok(false) => DeleteOutcome::Absent,
                Err(e) => {
                    debug!("Failed to delete {}: {}", concrete, e);
                    DeleteOutcome::Failed(e.to_string())
                }
            };
            report.outcomes.push((concrete, outcome));
        }
        let failed = report.failures().count();
        if failed > 0 {
            debug!(
                "{} of {} deletions failed for {}",
                failed,
                report.outcomes.len(),
                resource
            );
        }
        report
    }

    /// The first location, in order, that accepts stores.
    pub fn select_storage_resource(&self, resource: &VirtualResource) -> Option<ConcreteResource> {
        resource
            .locations()
            .iter()
            .find(|l| l.allows_stores())
            .map(|l| ConcreteResource::new(l.clone(), resource.path()))
    }

    /// Writes `content` to the selected storage location.
    pub fn store(
        &self,
        resource: &VirtualResource,
        content: &mut dyn Read,
        metadata: &EventMetadata,
    ) -> Result<Transfer> {
        let Some(target) = self.select_storage_resource(resource) else {
            warn!("Cannot store. No valid storage locations in group.");
            return Err(Error::NoStorageLocation {
                resource: resource.to_string(),
            });
        };
        self.manager.store(&target, content, metadata)
    }
}
