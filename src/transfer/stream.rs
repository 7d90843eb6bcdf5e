//! Stream wrappers returned by [`Transfer`](super::Transfer).
//!
//! [`TransferWriter`] owns the write lock of its resource through a
//! [`WriteLockGuard`]. Closing the writer, explicitly or by dropping it, is
//! the only way that lock is released, and it is released exactly once.
//!
//! Close order for a writer: flush and drop the decorated backend stream,
//! release the write lock, then fire the storage event. Readers fire their
//! access event once, on close or drop.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use log::warn;

use crate::cache::CacheProvider;
use crate::decorator::{ReadStream, WriteStream};
use crate::error::{Error, Result};
use crate::event::{FileEvent, FileEventManager};
use crate::resource::ConcreteResource;

/// A streamed-write hold on a resource's write lock, released on drop.
pub struct WriteLockGuard {
    provider: Arc<dyn CacheProvider>,
    resource: ConcreteResource,
}

impl WriteLockGuard {
    /// Takes the write lock, blocking while another thread holds it. Fails
    /// with [`Error::WriteInProgress`] if this resource already has an open
    /// streamed write.
    pub fn acquire(provider: Arc<dyn CacheProvider>, resource: ConcreteResource) -> Result<Self> {
        if !provider.try_lock_write_stream(&resource) {
            return Err(Error::WriteInProgress {
                resource: resource.to_string(),
            });
        }
        Ok(Self { provider, resource })
    }
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        self.provider.unlock_write_stream(&self.resource);
    }
}

impl fmt::Debug for WriteLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteLockGuard")
            .field("resource", &self.resource)
            .finish()
    }
}

/// An event to fire once a stream closes.
pub(crate) struct PendingEvent {
    pub(crate) event: FileEvent,
    pub(crate) events: Arc<dyn FileEventManager>,
}

impl PendingEvent {
    fn fire(self) {
        self.events.fire(self.event);
    }
}

/// Read stream over stored content.
pub struct TransferReader {
    inner: Option<ReadStream>,
    on_close: Option<PendingEvent>,
}

impl TransferReader {
    pub(crate) fn new(inner: ReadStream, on_close: Option<PendingEvent>) -> Self {
        Self {
            inner: Some(inner),
            on_close,
        }
    }

    /// Closes the stream, firing its access event if one was requested.
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.inner.take();
        if let Some(pending) = self.on_close.take() {
            pending.fire();
        }
    }
}

impl Read for TransferReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "stream is closed")),
        }
    }
}

impl Drop for TransferReader {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Write stream holding the resource's write lock until closed.
pub struct TransferWriter {
    inner: Option<WriteStream>,
    guard: Option<WriteLockGuard>,
    on_close: Option<PendingEvent>,
}

impl TransferWriter {
    pub(crate) fn new(
        inner: WriteStream,
        guard: WriteLockGuard,
        on_close: Option<PendingEvent>,
    ) -> Self {
        Self {
            inner: Some(inner),
            guard: Some(guard),
            on_close,
        }
    }

    /// Flushes and closes the stream, releasing the write lock. The lock is
    /// released and the storage event fired even if the final flush fails;
    /// the flush error is returned afterwards.
    pub fn close(mut self) -> io::Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> io::Result<()> {
        let flushed = match self.inner.take() {
            Some(mut inner) => inner.flush(),
            None => Ok(()),
        };
        self.guard.take();
        if let Some(pending) = self.on_close.take() {
            pending.fire();
        }
        flushed
    }
}

impl Write for TransferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "stream is closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for TransferWriter {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("flush failed while dropping write stream: {}", e);
        }
    }
}
