//! Transfer decoration hooks.
//!
//! A [`TransferDecorator`] is an optional strategy injected into every
//! [`Transfer`] built by a manager. It is invoked around each read or
//! mutating operation and may observe it, wrap the stream involved, filter
//! a listing, or override the existence check outright. Every method
//! defaults to a pass-through, so implementors only override the hooks they
//! care about.

use std::io::{self, Read, Write};

use crate::event::{EventMetadata, TransferOperation};
use crate::transfer::Transfer;

/// Boxed read stream handed to and returned from decorators.
pub type ReadStream = Box<dyn Read + Send>;

/// Boxed write stream handed to and returned from decorators.
pub type WriteStream = Box<dyn Write + Send>;

/// Result of [`TransferDecorator::decorate_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistsOverride {
    /// Defer to the storage provider.
    #[default]
    Passthrough,
    /// Report this answer instead of asking the provider.
    Override(bool),
}

pub trait TransferDecorator: Send + Sync {
    fn decorate_touch(&self, _transfer: &Transfer, _metadata: &EventMetadata) {}

    fn decorate_read(
        &self,
        stream: ReadStream,
        _transfer: &Transfer,
        _metadata: &EventMetadata,
    ) -> io::Result<ReadStream> {
        Ok(stream)
    }

    /// Wraps the backend write stream. The returned stream is flushed and
    /// dropped when the transfer's writer closes, before the write lock is
    /// released.
    fn decorate_write(
        &self,
        stream: WriteStream,
        _transfer: &Transfer,
        _operation: TransferOperation,
        _metadata: &EventMetadata,
    ) -> io::Result<WriteStream> {
        Ok(stream)
    }

    fn decorate_exists(&self, _transfer: &Transfer, _metadata: &EventMetadata) -> ExistsOverride {
        ExistsOverride::Passthrough
    }

    fn decorate_copy_from(
        &self,
        _from: &Transfer,
        _to: &Transfer,
        _metadata: &EventMetadata,
    ) -> io::Result<()> {
        Ok(())
    }

    fn decorate_delete(&self, _transfer: &Transfer, _metadata: &EventMetadata) -> io::Result<()> {
        Ok(())
    }

    fn decorate_listing(
        &self,
        _transfer: &Transfer,
        listing: Vec<String>,
        _metadata: &EventMetadata,
    ) -> io::Result<Vec<String>> {
        Ok(listing)
    }

    fn decorate_mkdirs(&self, _transfer: &Transfer, _metadata: &EventMetadata) -> io::Result<()> {
        Ok(())
    }

    fn decorate_create_file(
        &self,
        _transfer: &Transfer,
        _metadata: &EventMetadata,
    ) -> io::Result<()> {
        Ok(())
    }
}
