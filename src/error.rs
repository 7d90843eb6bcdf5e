//! # Error Handling
//!
//! This module defines the centralized error type for `repo-cache`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure the cache can report, each variant carrying enough context to
//! tell the caller which resource or location was involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failures surfaced by the library.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! ## What is not an error
//!
//! A missing resource is never reported through this type. Read and
//! existence paths return `Option`/`bool` instead, and waiting on a locked
//! resource is a blocking wait rather than a failure.
//!
//! Backend I/O failures are reported as [`Error::Storage`], naming the
//! operation and the physical path that failed. Orchestration failures such
//! as "no location in this group accepts stores" get their own variants so
//! callers can treat them as expected outcomes.

use thiserror::Error;

/// Main error type for repo-cache operations
#[derive(Error, Debug)]
pub enum Error {
    /// A resource was constructed with invalid arguments, such as a virtual
    /// resource with no locations.
    #[error("Invalid resource: {message}")]
    InvalidResource { message: String },

    /// A storage backend failed to perform an I/O operation.
    #[error("Storage error during {operation} on {path}: {source}")]
    Storage {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A second write was started on a resource whose write stream is still
    /// open on the same thread.
    #[error("Write already in progress for: {resource}")]
    WriteInProgress { resource: String },

    /// None of the candidate locations accepts stores.
    #[error("No deployment locations available for: {resource}")]
    NoStorageLocation { resource: String },

    /// The transport collaborator failed to fetch or publish content.
    #[error("Transport error for {location}: {message}")]
    Transport { location: String, message: String },

    /// A circular reference was detected while expanding location groups.
    #[error("Cycle detected in location groups: {cycle}")]
    CycleDetected { cycle: String },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A document parser rejected content retrieved from a location.
    #[error("Document error at {location}: {message}")]
    Document { location: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Wraps a backend I/O failure with the operation and physical path.
    pub fn storage(operation: &str, path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Error::Storage {
            operation: operation.to_string(),
            path: path.to_string(),
            source,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
