//! Response models for the API service

use media::CatalogEntry;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/videos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub videos: Vec<CatalogEntry>,
    pub status: String,
    pub count: usize,
}

impl VideoListResponse {
    pub fn ok(videos: Vec<CatalogEntry>) -> Self {
        Self {
            count: videos.len(),
            videos,
            status: "ok".to_string(),
        }
    }
}
