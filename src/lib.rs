//! # Repository Content Cache
//!
//! This library resolves logical artifact paths against an ordered list of
//! repository locations, stores the bytes it finds through a pluggable
//! storage backend, and coordinates concurrent readers and writers on every
//! resolved path. It is used by the `repo-cache` command-line tool but is
//! designed to be embedded in any artifact tooling that serves the same
//! logical artifact from several backing locations.
//!
//! ## Quick Example
//!
//! ```
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! use repo_cache::cache::MemoryCacheProvider;
//! use repo_cache::content::ContentManager;
//! use repo_cache::expander::GroupLocationExpander;
//! use repo_cache::location::Location;
//! use repo_cache::manager::CacheTransferManager;
//!
//! let local = Location::new("local", "file:///srv/local").with_stores(true);
//! let central = Location::new("central", "https://repo1.example.com/maven2");
//! let expander = GroupLocationExpander::new().with_group("public", vec![local, central]);
//!
//! let provider = Arc::new(MemoryCacheProvider::new(false));
//! let manager = Arc::new(CacheTransferManager::new(provider));
//! let content = ContentManager::new(manager, Arc::new(expander));
//!
//! let public = Location::group("public");
//! let mut pom: &[u8] = b"<project/>";
//! content.store(&public, "org/foo/foo-1.0.pom", &mut pom).unwrap();
//!
//! let transfer = content.retrieve(&public, "org/foo/foo-1.0.pom").unwrap().unwrap();
//! assert_eq!(transfer.location().name(), "local");
//!
//! let mut text = String::new();
//! transfer.open_input_stream(true).unwrap().unwrap().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "<project/>");
//! ```
//!
//! ## Core Concepts
//!
//! - **Resources (`location`, `resource`)**: a [`location::Location`] names a
//!   repository endpoint; a [`resource::ConcreteResource`] is one path in one
//!   location; a [`resource::VirtualResource`] is one path across an ordered
//!   list of locations.
//! - **Storage (`cache`)**: the [`cache::CacheProvider`] contract with a
//!   filesystem and an in-memory backend, plus the per-resource lock table
//!   every backend shares.
//! - **Transfers (`transfer`, `decorator`, `event`)**: the per-resource
//!   handle that mediates locking, decoration and event firing around I/O.
//! - **Resolution (`manager`, `transport`, `resolver`, `expander`,
//!   `content`)**: fetching on cache misses and the first/all/delete/store
//!   algorithms across locations and groups.
//! - **Documents (`doc_cache`, `reader`)**: parse-once reading of documents
//!   with a weak-reference cache.
//!
//! ## Concurrency
//!
//! Callers drive all concurrency; the library owns no threads. Writes to one
//! resource are exclusive and the write lock is released only when the
//! write stream closes. Reads wait out an in-flight writer but take no lock
//! of their own.

pub mod cache;
pub mod config;
pub mod content;
pub mod decorator;
pub mod defaults;
pub mod doc_cache;
pub mod error;
pub mod event;
pub mod expander;
pub mod location;
pub mod manager;
pub mod path;
pub mod reader;
pub mod resolver;
pub mod resource;
pub mod transfer;
pub mod transport;

#[cfg(test)]
mod resource_proptest;
