//! Error types for Vitrin operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Vitrin crates. Uses `thiserror` for derive macros.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in Vitrin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error at {}: {source}", .path.display())]
    IoWithPath {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source document could not be fetched.
    #[error("Fetch failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Fetch {
        /// HTTP status, when the server answered at all.
        status: Option<u16>,
        /// Human-readable description.
        message: String,
    },

    /// Malformed JSON or YAML payload.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A high-resolution image could not be preloaded.
    #[error("Preload failed for {url}: {message}")]
    Preload {
        /// Image URL that was probed.
        url: String,
        /// Human-readable description.
        message: String,
    },

    /// Invalid operation on the page model.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error without an HTTP status (network-level failure).
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a fetch error for a non-success HTTP status.
    pub fn fetch_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Fetch {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a preload error.
    pub fn preload(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Preload {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a DOM error.
    pub fn dom(msg: impl Into<String>) -> Self {
        Self::Dom(msg.into())
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error came from fetching the source document.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

/// Result type alias using Vitrin's Error type.
pub type Result<T> = std::result::Result<T, Error>;
