//! # Transport
//!
//! The transport is the collaborator that moves bytes between a location's
//! real endpoint and the local cache: fetching content the cache does not
//! hold yet, and publishing new content upstream. The cache itself never
//! talks to an endpoint directly.
//!
//! [`FileTransport`] serves `file://` locations, treating the directory the
//! URI points at as the repository. Locations with any other scheme are
//! reported as having nothing to fetch.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use log::debug;
use url::Url;

use crate::decorator::ReadStream;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::resource::ConcreteResource;

/// Fetch/publish collaborator for remote-backed locations.
pub trait Transport: Send + Sync {
    /// Opens the content at the location's endpoint, or `None` if the
    /// endpoint does not have it.
    fn fetch(&self, resource: &ConcreteResource) -> Result<Option<ReadStream>>;

    /// Sends `content` to the location's endpoint. Returns `false` if the
    /// endpoint cannot accept it.
    fn publish(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool>;
}

/// Transport for locations whose URI is a `file://` directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTransport;

impl FileTransport {
    pub fn new() -> Self {
        Self
    }

    /// Directory a `file://` location points at, or `None` for any other
    /// scheme.
    fn base_dir(location: &Location) -> Result<Option<PathBuf>> {
        let url = Url::parse(location.uri())?;
        if url.scheme() != "file" {
            return Ok(None);
        }
        url.to_file_path().map(Some).map_err(|_| Error::Transport {
            location: location.name().to_string(),
            message: format!("'{}' does not name a local directory", location.uri()),
        })
    }

    fn endpoint_path(resource: &ConcreteResource) -> Result<Option<PathBuf>> {
        let Some(mut path) = Self::base_dir(resource.location())? else {
            debug!("no file transport for {}", resource.location().uri());
            return Ok(None);
        };
        path.extend(resource.segments());
        Ok(Some(path))
    }
}

impl Transport for FileTransport {
    fn fetch(&self, resource: &ConcreteResource) -> Result<Option<ReadStream>> {
        let Some(path) = Self::endpoint_path(resource)? else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        match fs::File::open(&path) {
            Ok(file) => {
                debug!("fetching {} from {}", resource, path.display());
                Ok(Some(Box::new(io::BufReader::new(file))))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Transport {
                location: resource.location().name().to_string(),
                message: format!("failed to open {}: {}", path.display(), e),
            }),
        }
    }

    fn publish(
        &self,
        resource: &ConcreteResource,
        content: &mut dyn Read,
        length: u64,
        content_type: &str,
    ) -> Result<bool> {
        let Some(path) = Self::endpoint_path(resource)? else {
            return Ok(false);
        };
        if resource.is_root() {
            return Ok(false);
        }
        let transport_error = |e: io::Error| Error::Transport {
            location: resource.location().name().to_string(),
            message: format!("failed to publish to {}: {}", path.display(), e),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(transport_error)?;
        }
        let mut file = fs::File::create(&path).map_err(transport_error)?;
        let written = io::copy(content, &mut file).map_err(transport_error)?;
        debug!(
            "published {} ({} of {} bytes, {})",
            resource, written, length, content_type
        );
        Ok(true)
    }
}
