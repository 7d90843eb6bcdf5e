//! Filesystem storage backend.
//!
//! Every resource maps to `root/<encoded location uri>/<path>`. There is no
//! separate metadata store: existence, listing and deletion all operate on
//! that physical path directly.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;
use walkdir::WalkDir;

use super::{CacheProvider, LockTable};
use crate::decorator::{ReadStream, WriteStream};
use crate::error::{Error, Result};
use crate::path::encode_location_uri;
use crate::resource::ConcreteResource;

/// Stores content as plain files under a root directory.
#[derive(Debug)]
pub struct FileCacheProvider {
    root: PathBuf,
    alias_linking: bool,
    locks: LockTable,
}

impl FileCacheProvider {
    /// Creates a provider rooted at `root`. With `alias_linking` enabled,
    /// aliases are hard links; otherwise they are copies.
    pub fn new(root: impl Into<PathBuf>, alias_linking: bool) -> Self {
        Self {
            root: root.into(),
            alias_linking,
            locks: LockTable::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn alias_linking(&self) -> bool {
        self.alias_linking
    }

    /// The physical path backing a resource.
    pub fn physical_path(&self, resource: &ConcreteResource) -> PathBuf {
        let mut path = self.root.join(encode_location_uri(resource.location().uri()));
        for segment in resource.segments() {
            path.push(segment);
        }
        path
    }

    /// Paths of every file stored beneath `resource`, relative to its
    /// location and sorted.
    pub fn walk(&self, resource: &ConcreteResource) -> Result<Vec<String>> {
        let base = self.physical_path(&ConcreteResource::root(resource.location().clone()));
        let start = self.physical_path(resource);
        if !start.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&start).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&start).display().to_string();
                Error::storage("walk", path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&base) {
                let segments: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                files.push(segments.join("/"));
            }
        }
        Ok(files)
    }

    fn ensure_parent(&self, path: &Path, operation: &str) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| Error::storage(operation, dir.display(), e))?;
            }
        }
        Ok(())
    }
}

impl CacheProvider for FileCacheProvider {
    fn exists(&self, resource: &ConcreteResource) -> bool {
        self.physical_path(resource).exists()
    }

    fn is_directory(&self, resource: &ConcreteResource) -> bool {
        self.physical_path(resource).is_dir()
    }

    fn is_file(&self, resource: &ConcreteResource) -> bool {
        self.physical_path(resource).is_file()
    }

    fn open_input_stream(&self, resource: &ConcreteResource) -> Result<Option<ReadStream>> {
        let path = self.physical_path(resource);
        if path.is_dir() {
            return Ok(None);
        }
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage("open_input_stream", path.display(), e)),
        }
    }

    fn open_output_stream(&self, resource: &ConcreteResource) -> Result<WriteStream> {
        let path = self.physical_path(resource);
        self.ensure_parent(&path, "open_output_stream")?;
        let file = File::create(&path)
            .map_err(|e| Error::storage("open_output_stream", path.display(), e))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn copy(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()> {
        let src = self.physical_path(from);
        let dst = self.physical_path(to);
        if src == dst {
            return Ok(());
        }
        self.ensure_parent(&dst, "copy")?;
        // dst may be a hard link to src; truncating it would empty both.
        if dst.is_file() {
            fs::remove_file(&dst).map_err(|e| Error::storage("copy", dst.display(), e))?;
        }
        fs::copy(&src, &dst).map_err(|e| Error::storage("copy", src.display(), e))?;
        Ok(())
    }

    fn delete(&self, resource: &ConcreteResource) -> Result<bool> {
        let path = self.physical_path(resource);
        let result = if path.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage("delete", path.display(), e)),
        }
    }

    fn list(&self, resource: &ConcreteResource) -> Result<Vec<String>> {
        let path = self.physical_path(resource);
        if !path.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&path).map_err(|e| Error::storage("list", path.display(), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::storage("list", path.display(), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn mkdirs(&self, resource: &ConcreteResource) -> Result<()> {
        let path = self.physical_path(resource);
        fs::create_dir_all(&path).map_err(|e| Error::storage("mkdirs", path.display(), e))
    }

    fn create_file(&self, resource: &ConcreteResource) -> Result<()> {
        let path = self.physical_path(resource);
        self.ensure_parent(&path, "create_file")?;
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::storage("create_file", path.display(), e))?;
        Ok(())
    }

    fn create_alias(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()> {
        if from == to || !self.is_file(from) {
            return Ok(());
        }
        if !self.alias_linking {
            return self.copy(from, to);
        }

        let src = self.physical_path(from);
        let dst = self.physical_path(to);
        self.ensure_parent(&dst, "create_alias")?;
        if dst.is_file() {
            fs::remove_file(&dst).map_err(|e| Error::storage("create_alias", dst.display(), e))?;
        }
        debug!("hard-linking {} to {}", dst.display(), src.display());
        fs::hard_link(&src, &dst).map_err(|e| Error::storage("create_alias", dst.display(), e))
    }

    fn length(&self, resource: &ConcreteResource) -> u64 {
        fs::metadata(self.physical_path(resource))
            .map(|m| m.len())
            .unwrap_or(0)
    }

    fn last_modified(&self, resource: &ConcreteResource) -> Option<SystemTime> {
        fs::metadata(self.physical_path(resource))
            .and_then(|m| m.modified())
            .ok()
    }

    fn file_path(&self, resource: &ConcreteResource) -> String {
        self.physical_path(resource).display().to_string()
    }

    fn lock_table(&self) -> &LockTable {
        &self.locks
    }
}
