//! In-memory storage backend.
//!
//! Content lives in a map from resource to a shared file entry. Directories
//! are implicit: a resource is a directory when some stored resource lies
//! beneath it, or when it was created explicitly with `mkdirs`. With alias
//! linking enabled, an alias shares the source's entry, so later writes
//! through either resource are visible through both, the same way a hard
//! link behaves on disk.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use std::time::SystemTime;

use log::warn;
use parking_lot::RwLock;

use super::{CacheProvider, LockTable};
use crate::decorator::{ReadStream, WriteStream};
use crate::error::{Error, Result};
use crate::resource::ConcreteResource;

#[derive(Debug)]
struct Entry {
    content: Vec<u8>,
    modified: SystemTime,
}

impl Entry {
    fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            modified: SystemTime::now(),
        }
    }
}

type SharedEntry = Arc<RwLock<Entry>>;

#[derive(Debug, Default)]
struct Store {
    files: HashMap<ConcreteResource, SharedEntry>,
    dirs: HashSet<ConcreteResource>,
}

fn is_beneath(dir: &ConcreteResource, candidate: &ConcreteResource) -> bool {
    if dir.location() != candidate.location() || dir == candidate {
        return false;
    }
    dir.is_root()
        || candidate
            .path()
            .strip_prefix(dir.path())
            .is_some_and(|rest| rest.starts_with('/'))
}

fn storage_error(operation: &str, resource: &ConcreteResource, message: &str) -> Error {
    Error::storage(
        operation,
        format!("memory:{}", resource),
        io::Error::new(io::ErrorKind::Other, message.to_string()),
    )
}

impl Store {
    fn is_directory(&self, resource: &ConcreteResource) -> bool {
        self.dirs.contains(resource)
            || self.files.keys().any(|f| is_beneath(resource, f))
            || self.dirs.iter().any(|d| is_beneath(resource, d))
    }

    /// Fails if a stored file sits at `resource` or any of its ancestors.
    fn check_no_file_ancestor(&self, resource: &ConcreteResource, operation: &str) -> Result<()> {
        let mut current = resource.parent();
        loop {
            if self.files.contains_key(&current) {
                return Err(storage_error(
                    operation,
                    resource,
                    &format!("{} is a file, not a directory", current),
                ));
            }
            if current.is_root() {
                return Ok(());
            }
            current = current.parent();
        }
    }

    /// Replaces the content at `resource`, in place if an entry exists.
    fn commit(&mut self, resource: &ConcreteResource, content: Vec<u8>) {
        match self.files.get(resource) {
            Some(shared) => *shared.write() = Entry::new(content),
            None => {
                self.files
                    .insert(resource.clone(), Arc::new(RwLock::new(Entry::new(content))));
            }
        }
    }
}

/// In-process storage backend.
#[derive(Debug, Default)]
pub struct MemoryCacheProvider {
    store: Arc<RwLock<Store>>,
    alias_linking: bool,
    locks: LockTable,
}

impl MemoryCacheProvider {
    /// Create a new empty provider
    pub fn new(alias_linking: bool) -> Self {
        Self {
            alias_linking,
            ..Self::default()
        }
    }

    /// Store content directly, bypassing streams and locks.
    pub fn insert(&self, resource: &ConcreteResource, content: impl Into<Vec<u8>>) {
        self.store.write().commit(resource, content.into());
    }

    /// Snapshot of the stored content, if any.
    pub fn content(&self, resource: &ConcreteResource) -> Option<Vec<u8>> {
        self.store
            .read()
            .files
            .get(resource)
            .map(|f| f.read().content.clone())
    }

    /// Get the number of stored files
    pub fn len(&self) -> usize {
        self.store.read().files.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.store.read().files.is_empty()
    }
}

/// Buffers writes and publishes them to the shared entry on flush and drop.
struct MemoryWriter {
    store: Arc<RwLock<Store>>,
    resource: ConcreteResource,
    buffer: Vec<u8>,
    dirty: bool,
}

impl MemoryWriter {
    fn publish(&mut self) {
        if self.dirty {
            self.store
                .write()
                .commit(&self.resource, self.buffer.clone());
            self.dirty = false;
        }
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.dirty = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.publish();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.publish();
    }
}

impl CacheProvider for MemoryCacheProvider {
    fn exists(&self, resource: &ConcreteResource) -> bool {
        let store = self.store.read();
        store.files.contains_key(resource) || store.is_directory(resource)
    }

    fn is_directory(&self, resource: &ConcreteResource) -> bool {
        self.store.read().is_directory(resource)
    }

    fn is_file(&self, resource: &ConcreteResource) -> bool {
        self.store.read().files.contains_key(resource)
    }

    fn open_input_stream(&self, resource: &ConcreteResource) -> Result<Option<ReadStream>> {
        Ok(self.content(resource).map(|c| Box::new(Cursor::new(c)) as ReadStream))
    }

    fn open_output_stream(&self, resource: &ConcreteResource) -> Result<WriteStream> {
        let mut store = self.store.write();
        store.check_no_file_ancestor(resource, "open_output_stream")?;
        if store.dirs.contains(resource) {
            return Err(storage_error("open_output_stream", resource, "is a directory"));
        }
        store.commit(resource, Vec::new());
        Ok(Box::new(MemoryWriter {
            store: Arc::clone(&self.store),
            resource: resource.clone(),
            buffer: Vec::new(),
            dirty: false,
        }))
    }

    fn copy(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()> {
        let mut store = self.store.write();
        let content = match store.files.get(from) {
            Some(f) => f.read().content.clone(),
            None => return Err(storage_error("copy", from, "source does not exist")),
        };
        store.check_no_file_ancestor(to, "copy")?;
        store.commit(to, content);
        Ok(())
    }

    fn delete(&self, resource: &ConcreteResource) -> Result<bool> {
        let mut store = self.store.write();
        if store.files.remove(resource).is_some() {
            return Ok(true);
        }
        if store.is_directory(resource) {
            let has_children = store.files.keys().any(|f| is_beneath(resource, f))
                || store.dirs.iter().any(|d| is_beneath(resource, d));
            if has_children {
                return Err(storage_error("delete", resource, "directory not empty"));
            }
            return Ok(store.dirs.remove(resource));
        }
        Ok(false)
    }

    fn list(&self, resource: &ConcreteResource) -> Result<Vec<String>> {
        let store = self.store.read();
        let depth = resource.segments().count();
        let names: BTreeSet<String> = store
            .files
            .keys()
            .chain(store.dirs.iter())
            .filter(|r| is_beneath(resource, r))
            .filter_map(|r| r.segments().nth(depth).map(str::to_string))
            .collect();
        Ok(names.into_iter().collect())
    }

    fn mkdirs(&self, resource: &ConcreteResource) -> Result<()> {
        let mut store = self.store.write();
        if store.files.contains_key(resource) {
            return Err(storage_error("mkdirs", resource, "is a file"));
        }
        store.check_no_file_ancestor(resource, "mkdirs")?;
        store.dirs.insert(resource.clone());
        Ok(())
    }

    fn create_file(&self, resource: &ConcreteResource) -> Result<()> {
        let mut store = self.store.write();
        if store.files.contains_key(resource) {
            return Ok(());
        }
        store.check_no_file_ancestor(resource, "create_file")?;
        store.commit(resource, Vec::new());
        Ok(())
    }

    fn create_alias(&self, from: &ConcreteResource, to: &ConcreteResource) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let source = match self.store.read().files.get(from) {
            Some(shared) => Arc::clone(shared),
            None => return Ok(()),
        };
        if !self.alias_linking {
            return self.copy(from, to);
        }

        let mut store = self.store.write();
        store.check_no_file_ancestor(to, "create_alias")?;
        if store.files.insert(to.clone(), source).is_some() {
            warn!("alias {} replaced existing content", to);
        }
        Ok(())
    }

    fn length(&self, resource: &ConcreteResource) -> u64 {
        self.store
            .read()
            .files
            .get(resource)
            .map(|f| f.read().content.len() as u64)
            .unwrap_or(0)
    }

    fn last_modified(&self, resource: &ConcreteResource) -> Option<SystemTime> {
        self.store
            .read()
            .files
            .get(resource)
            .map(|f| f.read().modified)
    }

    fn file_path(&self, resource: &ConcreteResource) -> String {
        format!("memory:{}", resource)
    }

    fn lock_table(&self) -> &LockTable {
        &self.locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;
    use std::io::Read;

    fn local() -> Location {
        Location::new("local", "file:///srv/local")
    }

    fn remote() -> Location {
        Location::new("central", "https://repo1.example.com/maven2")
    }

    fn write(provider: &MemoryCacheProvider, resource: &ConcreteResource, content: &str) {
        let mut out = provider.open_output_stream(resource).unwrap();
        out.write_all(content.as_bytes()).unwrap();
    }

    fn read(provider: &MemoryCacheProvider, resource: &ConcreteResource) -> Option<String> {
        provider.open_input_stream(resource).unwrap().map(|mut s| {
            let mut buf = String::new();
            s.read_to_string(&mut buf).unwrap();
            buf
        })
    }

    #[test]
    fn test_write_then_read() {
        let provider = MemoryCacheProvider::new(false);
        let r = ConcreteResource::new(local(), "org/foo/foo.pom");
        assert!(read(&provider, &r).is_none());

        write(&provider, &r, "<project/>");
        assert_eq!(read(&provider, &r).as_deref(), Some("<project/>"));
        assert_eq!(provider.length(&r), 10);
        assert!(provider.last_modified(&r).is_some());
        assert!(provider.is_file(&r));
        assert!(provider.is_directory(&r.parent()));
        assert!(provider.exists(&r.parent()));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_open_output_truncates_immediately() {
        let provider = MemoryCacheProvider::new(false);
        let r = ConcreteResource::new(local(), "a.txt");
        provider.insert(&r, "old");

        let out = provider.open_output_stream(&r).unwrap();
        assert_eq!(provider.content(&r), Some(Vec::new()));
        drop(out);
        assert!(provider.exists(&r));
    }

    #[test]
    fn test_writes_visible_after_flush() {
        let provider = MemoryCacheProvider::new(false);
        let r = ConcreteResource::new(local(), "a.txt");
        let mut out = provider.open_output_stream(&r).unwrap();
        out.write_all(b"partial").unwrap();
        out.flush().unwrap();
        assert_eq!(provider.content(&r), Some(b"partial".to_vec()));
    }

    #[test]
    fn test_output_under_file_fails() {
        let provider = MemoryCacheProvider::new(false);
        provider.insert(&ConcreteResource::new(local(), "org"), "file");
        let result = provider.open_output_stream(&ConcreteResource::new(local(), "org/foo.jar"));
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[test]
    fn test_list_direct_children_only() {
        let provider = MemoryCacheProvider::new(false);
        provider.insert(&ConcreteResource::new(local(), "org/foo/a.jar"), "a");
        provider.insert(&ConcreteResource::new(local(), "org/foo/sub/b.jar"), "b");
        provider.insert(&ConcreteResource::new(local(), "org/bar/c.jar"), "c");
        provider.insert(&ConcreteResource::new(remote(), "org/foo/z.jar"), "z");
        provider
            .mkdirs(&ConcreteResource::new(local(), "org/foo/empty"))
            .unwrap();

        let dir = ConcreteResource::new(local(), "org/foo");
        assert_eq!(provider.list(&dir).unwrap(), vec!["a.jar", "empty", "sub"]);

        let root = ConcreteResource::root(local());
        assert_eq!(provider.list(&root).unwrap(), vec!["org"]);
    }

    #[test]
    fn test_delete() {
        let provider = MemoryCacheProvider::new(false);
        let file = ConcreteResource::new(local(), "org/foo/a.jar");
        provider.insert(&file, "a");

        assert!(provider.delete(&file.parent()).is_err());
        assert!(provider.delete(&file).unwrap());
        assert!(!provider.delete(&file).unwrap());

        let empty = ConcreteResource::new(local(), "empty");
        provider.mkdirs(&empty).unwrap();
        assert!(provider.delete(&empty).unwrap());
        assert!(!provider.exists(&empty));
    }

    #[test]
    fn test_create_file() {
        let provider = MemoryCacheProvider::new(false);
        let r = ConcreteResource::new(local(), "marker");
        provider.create_file(&r).unwrap();
        assert_eq!(provider.content(&r), Some(Vec::new()));

        provider.insert(&r, "kept");
        provider.create_file(&r).unwrap();
        assert_eq!(read(&provider, &r).as_deref(), Some("kept"));
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let provider = MemoryCacheProvider::new(false);
        let from = ConcreteResource::new(remote(), "missing");
        let to = ConcreteResource::new(local(), "missing");
        assert!(provider.copy(&from, &to).is_err());
    }

    #[test]
    fn test_alias_linking_shares_entry() {
        let provider = MemoryCacheProvider::new(true);
        let from = ConcreteResource::new(remote(), "org/foo.jar");
        let to = ConcreteResource::new(local(), "mirror/foo.jar");
        write(&provider, &from, "v1");

        provider.create_alias(&from, &to).unwrap();
        write(&provider, &from, "v2");
        assert_eq!(read(&provider, &to).as_deref(), Some("v2"));

        write(&provider, &to, "v3");
        assert_eq!(read(&provider, &from).as_deref(), Some("v3"));
    }

    #[test]
    fn test_alias_copy_mode_is_independent() {
        let provider = MemoryCacheProvider::new(false);
        let from = ConcreteResource::new(remote(), "org/foo.jar");
        let to = ConcreteResource::new(local(), "mirror/foo.jar");
        write(&provider, &from, "v1");

        provider.create_alias(&from, &to).unwrap();
        write(&provider, &from, "v2");
        assert_eq!(read(&provider, &to).as_deref(), Some("v1"));
    }

    #[test]
    fn test_alias_of_missing_source_is_noop() {
        let provider = MemoryCacheProvider::new(true);
        let from = ConcreteResource::new(remote(), "missing");
        let to = ConcreteResource::new(local(), "missing");
        provider.create_alias(&from, &to).unwrap();
        assert!(provider.is_empty());
    }
}
