//! Error types for backend collaborators.

use thiserror::Error;

/// Errors that can occur while fetching from the backend or boundary store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// A local boundary file could not be read.
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
}
