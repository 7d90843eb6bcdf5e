//! # File Events
//!
//! Every observable transfer operation can notify an event sink. Events are
//! fire-and-forget: a [`FileEventManager`] never reports failure back into
//! the calling path.
//!
//! - **Access**: content was read (fired when a read stream closes) or touched.
//! - **Storage**: content was written (fired when a write stream closes),
//!   tagged with the [`TransferOperation`] that produced it.
//! - **Deletion**: content was actually removed.
//! - **Error**: an I/O failure occurred while event firing was requested.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use parking_lot::Mutex;

use crate::resource::ConcreteResource;

/// Caller-supplied context carried through an operation into its events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMetadata {
    values: BTreeMap<String, String>,
}

impl EventMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Why content is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferOperation {
    Download,
    Upload,
    Listing,
    Generate,
}

impl fmt::Display for TransferOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferOperation::Download => "download",
            TransferOperation::Upload => "upload",
            TransferOperation::Listing => "listing",
            TransferOperation::Generate => "generate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Access {
        resource: ConcreteResource,
        metadata: EventMetadata,
    },
    Storage {
        resource: ConcreteResource,
        operation: TransferOperation,
        metadata: EventMetadata,
    },
    Deletion {
        resource: ConcreteResource,
        metadata: EventMetadata,
    },
    Error {
        resource: ConcreteResource,
        message: String,
        metadata: EventMetadata,
    },
}

impl FileEvent {
    pub fn resource(&self) -> &ConcreteResource {
        match self {
            FileEvent::Access { resource, .. }
            | FileEvent::Storage { resource, .. }
            | FileEvent::Deletion { resource, .. }
            | FileEvent::Error { resource, .. } => resource,
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        match self {
            FileEvent::Access { metadata, .. }
            | FileEvent::Storage { metadata, .. }
            | FileEvent::Deletion { metadata, .. }
            | FileEvent::Error { metadata, .. } => metadata,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FileEvent::Access { .. } => "access",
            FileEvent::Storage { .. } => "storage",
            FileEvent::Deletion { .. } => "deletion",
            FileEvent::Error { .. } => "error",
        }
    }
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEvent::Storage { operation, .. } => {
                write!(f, "{} ({}) {}", self.kind(), operation, self.resource())
            }
            FileEvent::Error { message, .. } => {
                write!(f, "{} {}: {}", self.kind(), self.resource(), message)
            }
            _ => write!(f, "{} {}", self.kind(), self.resource()),
        }
    }
}

/// Receives file events. Implementations must not panic.
pub trait FileEventManager: Send + Sync {
    fn fire(&self, event: FileEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventManager;

impl FileEventManager for NoOpEventManager {
    fn fire(&self, _event: FileEvent) {}
}

/// Logs every event at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventManager;

impl FileEventManager for LoggingEventManager {
    fn fire(&self, event: FileEvent) {
        debug!("file event: {}", event);
    }
}

/// Keeps every fired event in memory, in firing order.
#[derive(Debug, Default)]
pub struct RecordingEventManager {
    events: Mutex<Vec<FileEvent>>,
}

impl RecordingEventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FileEvent> {
        self.events.lock().clone()
    }

    /// Event kinds in firing order, e.g. `["storage", "access"]`.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(FileEvent::kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl FileEventManager for RecordingEventManager {
    fn fire(&self, event: FileEvent) {
        self.events.lock().push(event);
    }
}
