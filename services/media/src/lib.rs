//! Media library for the VOD server
//!
//! Scans the content directory into a catalog and keeps an on-disk cache of
//! preview images generated with an external frame extractor.

pub mod catalog;
pub mod models;
pub mod thumbnail_generator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::MediaCatalog;
pub use models::{CatalogEntry, MediaFile};
pub use thumbnail_generator::{FfmpegExtractor, FrameExtractor, ThumbnailCache};
