//! Error types for the catalog backends.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Backend is offline or unreachable
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Song not found: {0}")]
    NotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    /// Form input rejected before anything was sent
    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
