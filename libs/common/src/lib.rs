//! Common library for the VOD server
//!
//! This crate provides functionality shared by the media library and the
//! HTTP service: configuration loading and the error types used across
//! crate boundaries.

pub mod config;
pub mod error;

pub use crate::config::ServerConfig;
pub use crate::error::{ConfigError, MediaError};
