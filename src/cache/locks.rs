//! Per-resource write locks.
//!
//! The lock table maps each [`ConcreteResource`] to a lock created lazily on
//! first use. Entries are never removed, so the table grows with the number
//! of distinct resources ever locked.
//!
//! Write locks are exclusive across threads and re-entrant for the owning
//! thread. Release is counted rather than owner-checked, so a write stream
//! may be closed on a different thread from the one that opened it.
//!
//! Streamed writes are the exception to re-entrancy: while a stream hold is
//! open, [`LockTable::try_lock_stream`] refuses further stream holds even
//! for the owner, so a resource never has two writers in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::{trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::resource::ConcreteResource;

#[derive(Debug, Default)]
struct LockState {
    owner: Option<ThreadId>,
    holds: usize,
    streaming: bool,
}

impl LockState {
    fn blocks(&self, current: ThreadId) -> bool {
        self.holds > 0 && self.owner != Some(current)
    }

    fn release(&mut self) -> bool {
        self.holds -= 1;
        if self.holds == 0 {
            self.owner = None;
            self.streaming = false;
        }
        self.holds == 0
    }
}

#[derive(Debug, Default)]
struct ResourceLock {
    state: Mutex<LockState>,
    released: Condvar,
}

/// Table of write locks keyed by resource identity.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<ConcreteResource, Arc<ResourceLock>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, resource: &ConcreteResource) -> Arc<ResourceLock> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(resource.clone()).or_default())
    }

    fn existing(&self, resource: &ConcreteResource) -> Option<Arc<ResourceLock>> {
        self.locks.lock().get(resource).cloned()
    }

    /// Blocks until the calling thread holds the write lock.
    pub fn lock_write(&self, resource: &ConcreteResource) {
        let lock = self.entry(resource);
        let current = thread::current().id();
        let mut state = lock.state.lock();
        while state.blocks(current) {
            lock.released.wait(&mut state);
        }
        state.owner = Some(current);
        state.holds += 1;
        trace!("write lock acquired on {} (holds: {})", resource, state.holds);
    }

    /// Releases one hold on the write lock. Returns `false` if the resource
    /// was not locked.
    pub fn unlock_write(&self, resource: &ConcreteResource) -> bool {
        let Some(lock) = self.existing(resource) else {
            warn!("unlock requested for {} which was never locked", resource);
            return false;
        };
        let mut state = lock.state.lock();
        if state.holds == 0 {
            warn!("unlock requested for {} which is not locked", resource);
            return false;
        }
        if state.release() {
            lock.released.notify_all();
            trace!("write lock released on {}", resource);
        }
        true
    }

    /// Blocks until the calling thread holds the write lock for a streamed
    /// write. Returns `false` without taking a hold if a stream hold is
    /// already open, which can only be the caller's own.
    pub fn try_lock_stream(&self, resource: &ConcreteResource) -> bool {
        let lock = self.entry(resource);
        let current = thread::current().id();
        let mut state = lock.state.lock();
        while state.blocks(current) {
            lock.released.wait(&mut state);
        }
        if state.streaming {
            warn!("{} already has a write in flight", resource);
            return false;
        }
        state.owner = Some(current);
        state.holds += 1;
        state.streaming = true;
        trace!("stream lock acquired on {} (holds: {})", resource, state.holds);
        true
    }

    /// Releases a hold taken by [`LockTable::try_lock_stream`].
    pub fn unlock_stream(&self, resource: &ConcreteResource) -> bool {
        let Some(lock) = self.existing(resource) else {
            warn!("unlock requested for {} which was never locked", resource);
            return false;
        };
        let mut state = lock.state.lock();
        if !state.streaming {
            warn!("stream unlock requested for {} with no write in flight", resource);
            return false;
        }
        state.streaming = false;
        if state.release() {
            lock.released.notify_all();
            trace!("write lock released on {}", resource);
        }
        true
    }

    /// Blocks while another thread holds the write lock.
    pub fn wait_for_unlock(&self, resource: &ConcreteResource) {
        let Some(lock) = self.existing(resource) else {
            return;
        };
        let current = thread::current().id();
        let mut state = lock.state.lock();
        while state.blocks(current) {
            lock.released.wait(&mut state);
        }
    }

    pub fn is_write_locked(&self, resource: &ConcreteResource) -> bool {
        self.existing(resource)
            .map(|lock| lock.state.lock().holds > 0)
            .unwrap_or(false)
    }

    /// Number of resources that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
