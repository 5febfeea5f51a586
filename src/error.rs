//! Application error types using thiserror
//!
//! Error hierarchy:
//! - TrackerError: Issues resolving versions from an upstream source
//! - StackError: Issues loading or validating a stack document
//! - SelectorError: Issues reading or surgically rewriting a source file
//! - CheckError: Fail-fast outcome of a concurrent check pass

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Stack document related errors
    #[error(transparent)]
    Stack(#[from] StackError),

    /// Upstream tracker related errors
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Source file selector related errors
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Check pass related errors
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Errors raised by tracker backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Transport failure or non-2xx response
    #[error("failed to fetch '{uri}' from {tracker}: {message}")]
    Fetch {
        tracker: String,
        uri: String,
        message: String,
    },

    /// Malformed upstream payload or URI
    #[error("invalid response from {tracker} for '{uri}': {message}")]
    Parse {
        tracker: String,
        uri: String,
        message: String,
    },

    /// No releases, tags or selectable version
    #[error("no version found for '{uri}' in {tracker}: {message}")]
    NotFound {
        tracker: String,
        uri: String,
        message: String,
    },
}

/// Errors related to stack document loading
#[derive(Error, Debug)]
pub enum StackError {
    /// Failed to read the document
    #[error("failed to read stack file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is neither valid YAML nor valid JSON
    #[error("failed to parse stack file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Missing or duplicate dependency names
    #[error("invalid stack: {message}")]
    Validation { message: String },
}

/// Errors related to reading and rewriting values in source files
#[derive(Error, Debug)]
pub enum SelectorError {
    /// Failed to read the file
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the file
    #[error("failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path expression could not be parsed
    #[error("invalid selector '{selector}': {message}")]
    InvalidPath { selector: String, message: String },

    /// File content could not be parsed as YAML/JSON
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Path expression matched nothing
    #[error("selector '{selector}' matched nothing in {path}")]
    NotFound { path: PathBuf, selector: String },

    /// Value only exists because of template placeholder substitution
    #[error("selector '{selector}' in {path} resolved to template placeholder '{value}'")]
    Lossy {
        path: PathBuf,
        selector: String,
        value: String,
    },

    /// Current value does not occur verbatim exactly once
    #[error("cannot update {path}: {message}")]
    AmbiguousUpdate { path: PathBuf, message: String },
}

/// Errors that abort a check pass
#[derive(Error, Debug)]
pub enum CheckError {
    /// A tracker backend failed for one dependency
    #[error("dependency '{dependency}': {source}")]
    Tracker {
        dependency: String,
        #[source]
        source: TrackerError,
    },

    /// The current version could not be read from a source file
    #[error("dependency '{dependency}': {source}")]
    Selector {
        dependency: String,
        #[source]
        source: SelectorError,
    },

    /// A worker task panicked or was aborted
    #[error("check worker failed: {message}")]
    Worker { message: String },
}

impl TrackerError {
    /// Creates a new Fetch error
    pub fn fetch(
        tracker: impl Into<String>,
        uri: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TrackerError::Fetch {
            tracker: tracker.into(),
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Creates a new Parse error
    pub fn parse(
        tracker: impl Into<String>,
        uri: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TrackerError::Parse {
            tracker: tracker.into(),
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Creates a new NotFound error
    pub fn not_found(
        tracker: impl Into<String>,
        uri: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TrackerError::NotFound {
            tracker: tracker.into(),
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Returns true for NotFound errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }
}

impl StackError {
    /// Creates a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        StackError::Validation {
            message: message.into(),
        }
    }
}

impl SelectorError {
    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SelectorError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SelectorError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new InvalidPath error
    pub fn invalid_path(selector: impl Into<String>, message: impl Into<String>) -> Self {
        SelectorError::InvalidPath {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Creates a new AmbiguousUpdate error
    pub fn ambiguous_update(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SelectorError::AmbiguousUpdate {
            path: path.into(),
            message: message.into(),
        }
    }
}
