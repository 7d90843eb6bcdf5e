//! # Transfer Handles
//!
//! A [`Transfer`] is the façade clients use for all I/O on one
//! [`ConcreteResource`]. It owns no bytes: every call goes back to the
//! [`CacheProvider`], taking or waiting on the provider's per-resource locks,
//! running the optional [`TransferDecorator`], and firing events.
//!
//! Handles are cheap to build and may be created many times for the same
//! resource; only the underlying `(Location, path)` identity matters for
//! locking.
//!
//! ## Stream lifecycles
//!
//! - [`Transfer::open_input_stream`] waits out any in-flight writer, then
//!   opens the stored content. It takes no lock of its own.
//! - [`Transfer::open_output_stream`] takes the write lock and hands it to
//!   the returned [`TransferWriter`]. Closing that writer is the only thing
//!   that releases the lock; callers must not unlock separately.

pub mod stream;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, info};

use crate::cache::CacheProvider;
use crate::decorator::{ExistsOverride, TransferDecorator};
use crate::error::{Error, Result};
use crate::event::{EventMetadata, FileEvent, FileEventManager, TransferOperation};
use crate::location::Location;
use crate::resource::ConcreteResource;

pub use stream::{TransferReader, TransferWriter, WriteLockGuard};
use stream::PendingEvent;

/// Per-resource I/O handle.
#[derive(Clone)]
pub struct Transfer {
    resource: ConcreteResource,
    provider: Arc<dyn CacheProvider>,
    events: Arc<dyn FileEventManager>,
    decorator: Option<Arc<dyn TransferDecorator>>,
}

impl Transfer {
    pub fn new(
        resource: ConcreteResource,
        provider: Arc<dyn CacheProvider>,
        events: Arc<dyn FileEventManager>,
        decorator: Option<Arc<dyn TransferDecorator>>,
    ) -> Self {
        Self {
            resource,
            provider,
            events,
            decorator,
        }
    }

    /// A handle for another resource sharing this handle's collaborators.
    fn sibling_handle(&self, resource: ConcreteResource) -> Transfer {
        Transfer {
            resource,
            provider: Arc::clone(&self.provider),
            events: Arc::clone(&self.events),
            decorator: self.decorator.clone(),
        }
    }

    pub fn resource(&self) -> &ConcreteResource {
        &self.resource
    }

    pub fn location(&self) -> &Location {
        self.resource.location()
    }

    pub fn path(&self) -> &str {
        self.resource.path()
    }

    /// Where the provider stores this resource.
    pub fn full_path(&self) -> String {
        self.provider.file_path(&self.resource)
    }

    pub fn decorator(&self) -> Option<&Arc<dyn TransferDecorator>> {
        self.decorator.as_ref()
    }

    pub fn is_directory(&self) -> bool {
        self.provider.is_directory(&self.resource)
    }

    pub fn is_file(&self) -> bool {
        self.provider.is_file(&self.resource)
    }

    /// The parent handle. The root is its own parent.
    pub fn parent(&self) -> Transfer {
        if self.resource.is_root() {
            return self.clone();
        }
        self.sibling_handle(self.resource.parent())
    }

    pub fn child(&self, name: &str) -> Transfer {
        self.sibling_handle(self.resource.child(name))
    }

    /// `parent().child(name)`; `None` on a root resource.
    pub fn sibling(&self, name: &str) -> Option<Transfer> {
        if self.resource.is_root() {
            return None;
        }
        Some(self.parent().child(name))
    }

    /// Addresses a co-located metadata file by appending `suffix` to the
    /// full path, e.g. `foo.jar` + `.sha1`. `None` on a root resource.
    pub fn sibling_meta(&self, suffix: &str) -> Option<Transfer> {
        let resource = self.resource.with_suffix(suffix)?;
        debug!("creating meta sibling {} for {}", resource, self);
        Some(self.sibling_handle(resource))
    }

    pub fn touch(&self) {
        self.touch_with(EventMetadata::default());
    }

    /// Records an access without opening a stream.
    pub fn touch_with(&self, metadata: EventMetadata) {
        if let Some(decorator) = &self.decorator {
            decorator.decorate_touch(self, &metadata);
        }
        self.events.fire(FileEvent::Access {
            resource: self.resource.clone(),
            metadata,
        });
    }

    pub fn open_input_stream(&self, fire_events: bool) -> Result<Option<TransferReader>> {
        self.open_input_stream_with(fire_events, EventMetadata::default())
    }

    /// Opens the stored content for reading, or `None` if there is none.
    ///
    /// Blocks while another thread holds the write lock. With `fire_events`,
    /// an access event fires when the returned reader closes, and an error
    /// event fires if opening fails.
    pub fn open_input_stream_with(
        &self,
        fire_events: bool,
        metadata: EventMetadata,
    ) -> Result<Option<TransferReader>> {
        self.provider.wait_for_read_unlock(&self.resource);
        let result = self.open_reader(fire_events, &metadata);
        if let Err(e) = &result {
            self.fire_error(fire_events, e, &metadata);
        }
        result
    }

    fn open_reader(
        &self,
        fire_events: bool,
        metadata: &EventMetadata,
    ) -> Result<Option<TransferReader>> {
        let Some(mut stream) = self.provider.open_input_stream(&self.resource)? else {
            return Ok(None);
        };
        if let Some(decorator) = &self.decorator {
            stream = decorator
                .decorate_read(stream, self, metadata)
                .map_err(|e| self.storage_error("decorate_read", e))?;
        }
        let on_close = fire_events.then(|| PendingEvent {
            event: FileEvent::Access {
                resource: self.resource.clone(),
                metadata: metadata.clone(),
            },
            events: Arc::clone(&self.events),
        });
        Ok(Some(TransferReader::new(stream, on_close)))
    }

    pub fn open_output_stream(&self, operation: TransferOperation) -> Result<TransferWriter> {
        self.open_output_stream_with(operation, true, EventMetadata::default())
    }

    /// Opens a stream replacing the stored content.
    ///
    /// Blocks until this thread holds the write lock. The lock belongs to
    /// the returned writer and is released when it closes; if opening fails
    /// the lock is released before the error is returned. A second writer
    /// opened while this thread's first is still open fails with
    /// [`Error::WriteInProgress`].
    pub fn open_output_stream_with(
        &self,
        operation: TransferOperation,
        fire_events: bool,
        metadata: EventMetadata,
    ) -> Result<TransferWriter> {
        self.provider.wait_for_write_unlock(&self.resource);
        let result = WriteLockGuard::acquire(Arc::clone(&self.provider), self.resource.clone())
            .and_then(|guard| self.open_writer(guard, operation, fire_events, &metadata));
        if let Err(e) = &result {
            self.fire_error(fire_events, e, &metadata);
        }
        result
    }

    fn open_writer(
        &self,
        guard: WriteLockGuard,
        operation: TransferOperation,
        fire_events: bool,
        metadata: &EventMetadata,
    ) -> Result<TransferWriter> {
        let mut stream = self.provider.open_output_stream(&self.resource)?;
        if let Some(decorator) = &self.decorator {
            stream = decorator
                .decorate_write(stream, self, operation, metadata)
                .map_err(|e| self.storage_error("decorate_write", e))?;
        }
        let on_close = if fire_events {
            info!(
                "Wrapping output stream to: {} using event metadata: {:?}",
                self, metadata
            );
            Some(PendingEvent {
                event: FileEvent::Storage {
                    resource: self.resource.clone(),
                    operation,
                    metadata: metadata.clone(),
                },
                events: Arc::clone(&self.events),
            })
        } else {
            info!("Wrapping output stream to: {} WITHOUT event metadata", self);
            None
        };
        Ok(TransferWriter::new(stream, guard, on_close))
    }

    /// Whether content exists, unless the decorator overrides the answer.
    pub fn exists(&self) -> bool {
        if let Some(decorator) = &self.decorator {
            if let ExistsOverride::Override(answer) =
                decorator.decorate_exists(self, &EventMetadata::default())
            {
                return answer;
            }
        }
        self.provider.exists(&self.resource)
    }

    /// Replaces this resource's content with `other`'s under the write lock.
    pub fn copy_from(&self, other: &Transfer) -> Result<()> {
        self.provider.wait_for_write_unlock(&self.resource);
        let _guard = WriteLockGuard::acquire(Arc::clone(&self.provider), self.resource.clone())?;
        if let Some(decorator) = &self.decorator {
            decorator
                .decorate_copy_from(other, self, &EventMetadata::default())
                .map_err(|e| self.storage_error("decorate_copy_from", e))?;
        }
        self.provider.copy(&other.resource, &self.resource)
    }

    pub fn delete(&self, fire_events: bool) -> Result<bool> {
        self.delete_with(fire_events, EventMetadata::default())
    }

    /// Deletes the stored content. Waits out an in-flight writer but takes
    /// no lock. A deletion event fires only if something was removed.
    pub fn delete_with(&self, fire_events: bool, metadata: EventMetadata) -> Result<bool> {
        self.provider.wait_for_write_unlock(&self.resource);
        let result = self.remove(&metadata);
        match &result {
            Ok(true) if fire_events => self.events.fire(FileEvent::Deletion {
                resource: self.resource.clone(),
                metadata,
            }),
            Err(e) => self.fire_error(fire_events, e, &metadata),
            _ => {}
        }
        result
    }

    fn remove(&self, metadata: &EventMetadata) -> Result<bool> {
        if let Some(decorator) = &self.decorator {
            decorator
                .decorate_delete(self, metadata)
                .map_err(|e| self.storage_error("decorate_delete", e))?;
        }
        self.provider.delete(&self.resource)
    }

    /// Names of the direct children, after decorator post-processing.
    pub fn list(&self) -> Result<Vec<String>> {
        let listing = self.provider.list(&self.resource)?;
        match &self.decorator {
            Some(decorator) => decorator
                .decorate_listing(self, listing, &EventMetadata::default())
                .map_err(|e| self.storage_error("decorate_listing", e)),
            None => Ok(listing),
        }
    }

    pub fn mkdirs(&self) -> Result<()> {
        if let Some(decorator) = &self.decorator {
            decorator
                .decorate_mkdirs(self, &EventMetadata::default())
                .map_err(|e| self.storage_error("decorate_mkdirs", e))?;
        }
        self.provider.mkdirs(&self.resource)
    }

    pub fn create_file(&self) -> Result<()> {
        self.provider.wait_for_write_unlock(&self.resource);
        if let Some(decorator) = &self.decorator {
            decorator
                .decorate_create_file(self, &EventMetadata::default())
                .map_err(|e| self.storage_error("decorate_create_file", e))?;
        }
        self.provider.create_file(&self.resource)
    }

    pub fn length(&self) -> u64 {
        self.provider.length(&self.resource)
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.provider.last_modified(&self.resource)
    }

    /// Takes the write lock for a manual critical section. Pair with
    /// [`Transfer::unlock`].
    pub fn lock_write(&self) {
        self.provider.lock_write(&self.resource);
    }

    pub fn unlock(&self) -> bool {
        self.provider.unlock_write(&self.resource)
    }

    pub fn is_write_locked(&self) -> bool {
        self.provider.is_write_locked(&self.resource)
    }

    fn fire_error(&self, fire_events: bool, error: &Error, metadata: &EventMetadata) {
        if fire_events {
            self.events.fire(FileEvent::Error {
                resource: self.resource.clone(),
                message: error.to_string(),
                metadata: metadata.clone(),
            });
        }
    }

    fn storage_error(&self, operation: &str, source: io::Error) -> Error {
        Error::storage(operation, self.full_path(), source)
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (stored at: {})",
            self.resource.location(),
            self.resource.path(),
            self.full_path()
        )
    }
}

impl fmt::Debug for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transfer")
            .field("resource", &self.resource)
            .field("decorated", &self.decorator.is_some())
            .finish()
    }
}
