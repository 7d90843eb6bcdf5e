//! # Document Cache
//!
//! Parsed documents are expensive to rebuild but should not outlive their
//! users. [`DocumentCache`] keeps a [`Weak`] reference per
//! `(key, location)` pair: a document stays reachable through the cache for
//! as long as some caller holds an `Arc` to it, and silently becomes a miss
//! afterwards.
//!
//! Dead entries found during a lookup are removed on the spot.
//! [`DocumentCache::purge`] sweeps the whole table.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::location::Location;

/// A document that knows which key and location it was read for.
pub trait CachedDocument: Send + Sync {
    type Key: Clone + Eq + Hash + Send + Sync;

    fn key(&self) -> Self::Key;

    fn location(&self) -> &Location;
}

type Entries<D> = HashMap<(<D as CachedDocument>::Key, Location), Weak<D>>;

/// Weak-reference cache of parsed documents.
pub struct DocumentCache<D: CachedDocument> {
    entries: Mutex<Entries<D>>,
}

impl<D: CachedDocument> Default for DocumentCache<D> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<D: CachedDocument> DocumentCache<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches `document` under its own key and location, replacing any
    /// previous entry.
    pub fn put(&self, document: &Arc<D>) {
        let slot = (document.key(), document.location().clone());
        self.entries.lock().insert(slot, Arc::downgrade(document));
    }

    fn lookup(entries: &mut Entries<D>, key: &D::Key, location: &Location) -> Option<Arc<D>> {
        let slot = (key.clone(), location.clone());
        let live = entries.get(&slot)?.upgrade();
        if live.is_none() {
            entries.remove(&slot);
        }
        live
    }

    /// The first live document for `key`, scanning `locations` in order.
    pub fn get_first(&self, key: &D::Key, locations: &[Location]) -> Option<Arc<D>> {
        let mut entries = self.entries.lock();
        locations
            .iter()
            .find_map(|location| Self::lookup(&mut entries, key, location))
    }

    /// Every live document for `key` across `locations`, in location order.
    pub fn get_all(&self, key: &D::Key, locations: &[Location]) -> Vec<(Location, Arc<D>)> {
        let mut entries = self.entries.lock();
        locations
            .iter()
            .filter_map(|location| {
                Self::lookup(&mut entries, key, location).map(|doc| (location.clone(), doc))
            })
            .collect()
    }

    /// Removes every dead entry. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        before - entries.len()
    }

    /// Number of entries, live or not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
