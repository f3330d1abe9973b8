//! Custom error types for the common library
//!
//! This module defines the error types shared by the media library and the
//! HTTP server.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for media lookups and filesystem access
#[derive(Error, Debug)]
pub enum MediaError {
    /// The requested file does not exist in the served directory
    #[error("Media not found: {0}")]
    NotFound(String),

    /// The identifier cannot name a single file inside the served directory
    #[error("Invalid media identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Underlying filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for loading and applying the server configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A configured directory could not be created
    #[error("Failed to prepare directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result with MediaError
pub type MediaResult<T> = Result<T, MediaError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
