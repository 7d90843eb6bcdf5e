//! # Transfer Managers
//!
//! A [`TransferManager`] hands out [`Transfer`] handles for concrete
//! resources and implements the primitives the resolver and the content
//! manager are built on: retrieve, store, publish and delete.
//!
//! [`CacheTransferManager`] is the cache-backed implementation. Every handle
//! it builds shares one [`CacheProvider`], one event manager and one optional
//! decorator. When the cache misses and the location allows downloading, it
//! asks its [`Transport`] for the content and streams it into the cache
//! before returning the handle.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use log::{debug, warn};

use crate::cache::CacheProvider;
use crate::decorator::TransferDecorator;
use crate::error::{Error, Result};
use crate::event::{EventMetadata, FileEventManager, LoggingEventManager, TransferOperation};
use crate::resource::ConcreteResource;
use crate::transfer::Transfer;
use crate::transport::Transport;

/// Supplies transfer handles and the storage primitives over them.
pub trait TransferManager: Send + Sync {
    /// A handle for the resource without any I/O.
    fn cache_reference(&self, resource: &ConcreteResource) -> Transfer;

    /// The handle if the content is available, fetching it first when the
    /// cache misses and the location allows it.
    fn retrieve(
        &self,
        resource: &ConcreteResource,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>>;

    /// Writes `content` to the resource and returns its handle.
    fn store(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        metadata: &EventMetadata,
    ) -> Result<Transfer>;

    /// Sends `content` to the location's endpoint.
    fn publish(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool>;

    /// Removes the cached content. Returns `true` if something was removed.
    fn delete(&self, resource: &ConcreteResource, metadata: &EventMetadata) -> Result<bool>;
}

impl<T: TransferManager + ?Sized> TransferManager for Arc<T> {
    fn cache_reference(&self, resource: &ConcreteResource) -> Transfer {
        (**self).cache_reference(resource)
    }

    fn retrieve(
        &self,
        resource: &ConcreteResource,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>> {
        (**self).retrieve(resource, metadata)
    }

    fn store(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        metadata: &EventMetadata,
    ) -> Result<Transfer> {
        (**self).store(resource, content, metadata)
    }

    fn publish(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool> {
        (**self).publish(resource, content, length, content_type)
    }

    fn delete(&self, resource: &ConcreteResource, metadata: &EventMetadata) -> Result<bool> {
        (**self).delete(resource, metadata)
    }
}

/// Transfer manager backed by a cache provider.
pub struct CacheTransferManager {
    provider: Arc<dyn CacheProvider>,
    events: Arc<dyn FileEventManager>,
    decorator: Option<Arc<dyn TransferDecorator>>,
    transport: Option<Arc<dyn Transport>>,
}

impl CacheTransferManager {
    /// Creates a manager that logs events and never fetches.
    pub fn new(provider: Arc<dyn CacheProvider>) -> Self {
        Self {
            provider,
            events: Arc::new(LoggingEventManager),
            decorator: None,
            transport: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn FileEventManager>) -> Self {
        self.events = events;
        self
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn TransferDecorator>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn provider(&self) -> &Arc<dyn CacheProvider> {
        &self.provider
    }

    /// Makes the content cached at `from` reachable at `to`.
    pub fn create_alias(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()> {
        self.provider.create_alias(from, to)
    }

    fn download(
        &self,
        transport: &dyn Transport,
        transfer: &Transfer,
        metadata: &EventMetadata,
    ) -> Result<bool> {
        let resource = transfer.resource();
        let Some(mut source) = transport.fetch(resource)? else {
            return Ok(false);
        };
        let mut writer = transfer.open_output_stream_with(
            TransferOperation::Download,
            true,
            metadata.clone(),
        )?;
        let copied = match io::copy(&mut source, &mut writer) {
            Ok(n) => writer.close().map(|()| n),
            Err(e) => {
                drop(writer);
                Err(e)
            }
        };
        match copied {
            Ok(n) => {
                debug!("downloaded {} bytes into {}", n, transfer);
                Ok(true)
            }
            Err(e) => {
                if let Err(cleanup) = transfer.delete(false) {
                    warn!("failed to remove partial download {}: {}", transfer, cleanup);
                }
                Err(Error::Transport {
                    location: resource.location().name().to_string(),
                    message: format!("failed to download {}: {}", resource, e),
                })
            }
        }
    }
}

impl fmt::Debug for CacheTransferManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheTransferManager")
            .field("decorated", &self.decorator.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl TransferManager for CacheTransferManager {
    fn cache_reference(&self, resource: &ConcreteResource) -> Transfer {
        Transfer::new(
            resource.clone(),
            Arc::clone(&self.provider),
            Arc::clone(&self.events),
            self.decorator.clone(),
        )
    }

    fn retrieve(
        &self,
        resource: &ConcreteResource,
        metadata: &EventMetadata,
    ) -> Result<Option<Transfer>> {
        let transfer = self.cache_reference(resource);
        if transfer.exists() {
            return Ok(Some(transfer));
        }
        if !resource.location().allows_downloading() {
            return Ok(None);
        }
        let Some(transport) = &self.transport else {
            return Ok(None);
        };
        if self.download(transport.as_ref(), &transfer, metadata)? {
            Ok(Some(transfer))
        } else {
            Ok(None)
        }
    }

    fn store(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        metadata: &EventMetadata,
    ) -> Result<Transfer> {
        let transfer = self.cache_reference(resource);
        let mut writer =
            transfer.open_output_stream_with(TransferOperation::Upload, true, metadata.clone())?;
        let written = match io::copy(content, &mut writer) {
            Ok(n) => writer.close().map(|()| n),
            Err(e) => {
                drop(writer);
                Err(e)
            }
        };
        let written = written.map_err(|e| Error::storage("store", transfer.full_path(), e))?;
        debug!("stored {} bytes at {}", written, transfer);
        Ok(transfer)
    }

    fn publish(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool> {
        match &self.transport {
            Some(transport) => transport.publish(resource, content, length, content_type),
            None => Err(Error::Transport {
                location: resource.location().name().to_string(),
                message: "no transport configured for publishing".to_string(),
            }),
        }
    }

    fn delete(&self, resource: &ConcreteResource, metadata: &EventMetadata) -> Result<bool> {
        self.cache_reference(resource)
            .delete_with(true, metadata.clone())
    }
}
