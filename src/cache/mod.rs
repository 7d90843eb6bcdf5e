//! # Storage Providers
//!
//! This module defines [`CacheProvider`], the contract every storage backend
//! implements, together with the two backends shipped with the crate.
//!
//! ## Design
//!
//! Backends only implement content operations. Locking is supplied by the
//! trait's provided methods on top of a [`LockTable`] the backend exposes, so
//! every backend shares identical locking semantics:
//!
//! - **Write lock**: exclusive per `(Location, path)`, blocking on acquire.
//!   Re-entrant for its owner, but only one streamed write may be open.
//! - **Read wait**: readers only wait out an in-flight writer; they take no
//!   lock of their own, so a reader may overlap a writer that starts later.
//!
//! A backend with its own locking (for example a shared remote store) may
//! override the provided lock methods.
//!
//! ## Backends
//!
//! - [`FileCacheProvider`]: one physical file per resource under
//!   `root/<encoded location uri>/<path>`.
//! - [`MemoryCacheProvider`]: an in-process store, mostly useful in tests and
//!   for generated content.

pub mod file;
pub mod locks;
pub mod memory;

use std::time::SystemTime;

use crate::decorator::{ReadStream, WriteStream};
use crate::error::Result;
use crate::resource::ConcreteResource;

pub use file::FileCacheProvider;
pub use locks::LockTable;
pub use memory::MemoryCacheProvider;

/// Storage backend contract.
pub trait CacheProvider: Send + Sync {
    fn exists(&self, resource: &ConcreteResource) -> bool;

    fn is_directory(&self, resource: &ConcreteResource) -> bool;

    fn is_file(&self, resource: &ConcreteResource) -> bool;

    /// Opens the stored content, or `None` if there is none.
    fn open_input_stream(&self, resource: &ConcreteResource) -> Result<Option<ReadStream>>;

    /// Opens a stream replacing the stored content. Parent directories are
    /// created as needed.
    fn open_output_stream(&self, resource: &ConcreteResource) -> Result<WriteStream>;

    fn copy(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()>;

    /// Removes the resource. Returns `true` if something was removed.
    fn delete(&self, resource: &ConcreteResource) -> Result<bool>;

    /// Names of the direct children, sorted. Empty if the resource is not a
    /// directory.
    fn list(&self, resource: &ConcreteResource) -> Result<Vec<String>>;

    fn mkdirs(&self, resource: &ConcreteResource) -> Result<()>;

    /// Creates an empty file if none exists. Existing content is kept.
    fn create_file(&self, resource: &ConcreteResource) -> Result<()>;

    /// Makes the content stored at `from` reachable at `to`, either by
    /// hard-linking or by copying depending on the backend's configuration.
    /// A no-op when both name the same resource or `from` holds nothing.
    fn create_alias(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()>;

    /// Content length in bytes, `0` if absent.
    fn length(&self, resource: &ConcreteResource) -> u64;

    fn last_modified(&self, resource: &ConcreteResource) -> Option<SystemTime>;

    /// Human-readable description of where the resource is stored.
    fn file_path(&self, resource: &ConcreteResource) -> String;

    fn lock_table(&self) -> &LockTable;

    fn lock_write(&self, resource: &ConcreteResource) {
        self.lock_table().lock_write(resource);
    }

    fn unlock_write(&self, resource: &ConcreteResource) -> bool {
        self.lock_table().unlock_write(resource)
    }

    /// Takes the write lock for one streamed write. `false` if a streamed
    /// write on this resource is still open.
    fn try_lock_write_stream(&self, resource: &ConcreteResource) -> bool {
        self.lock_table().try_lock_stream(resource)
    }

    fn unlock_write_stream(&self, resource: &ConcreteResource) -> bool {
        self.lock_table().unlock_stream(resource)
    }

    fn wait_for_write_unlock(&self, resource: &ConcreteResource) {
        self.lock_table().wait_for_unlock(resource);
    }

    fn wait_for_read_unlock(&self, resource: &ConcreteResource) {
        self.lock_table().wait_for_unlock(resource);
    }

    fn is_write_locked(&self, resource: &ConcreteResource) -> bool {
        self.lock_table().is_write_locked(resource)
    }
}
