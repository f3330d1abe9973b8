use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A playable file found in the content directory during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// URL-safe encoding of the file name
    pub identifier: String,
    /// Raw file name
    pub display_name: String,
    /// Lower-cased extension without the dot
    pub extension: String,
    /// Location on disk
    pub path: PathBuf,
}

/// Listing record handed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    pub thumbnail: Option<String>,
}
