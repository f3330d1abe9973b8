//! Media catalog built from the content directory
//!
//! The directory listing is the only source of truth: every call rescans it
//! and nothing is cached between requests apart from the preview images.

use crate::models::{CatalogEntry, MediaFile};
use crate::thumbnail_generator::{FrameExtractor, ThumbnailCache};
use common::ServerConfig;
use common::error::{MediaError, MediaResult};
use futures::future::join_all;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Percent-encode a file name so it fits in a single URL path segment
pub fn encode_identifier(file_name: &str) -> String {
    urlencoding::encode(file_name).into_owned()
}

#[derive(Clone)]
pub struct MediaCatalog {
    content_dir: PathBuf,
    supported_extensions: Vec<String>,
    thumbnails: ThumbnailCache,
}

impl MediaCatalog {
    pub fn new(
        content_dir: PathBuf,
        supported_extensions: Vec<String>,
        thumbnails: ThumbnailCache,
    ) -> Self {
        Self {
            content_dir,
            supported_extensions,
            thumbnails,
        }
    }

    pub fn from_config(config: &ServerConfig, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self::new(
            config.content_dir.clone(),
            config.supported_extensions.clone(),
            ThumbnailCache::new(config.thumbnail_dir.clone(), extractor),
        )
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    /// Lower-cased extension of `file_name` if it is in the supported set
    pub fn supported_extension(&self, file_name: &str) -> Option<String> {
        let extension = file_extension(file_name)?;

        self.supported_extensions
            .contains(&extension)
            .then_some(extension)
    }

    /// List the playable files of the content directory, sorted by name
    pub async fn scan(&self) -> MediaResult<Vec<MediaFile>> {
        let mut read_dir = tokio::fs::read_dir(&self.content_dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let Ok(display_name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 file name {:?}", entry.file_name());
                continue;
            };

            let Some(extension) = self.supported_extension(&display_name) else {
                continue;
            };

            let path = entry.path();
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            files.push(MediaFile {
                identifier: encode_identifier(&display_name),
                display_name,
                extension,
                path,
            });
        }

        files.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(files)
    }

    /// Build the listing for clients reaching the server through `host`.
    ///
    /// Missing previews are generated before returning. An unreadable
    /// content directory yields an empty listing.
    pub async fn list_catalog(&self, host: &str) -> Vec<CatalogEntry> {
        let files = match self.scan().await {
            Ok(files) => files,
            Err(e) => {
                error!(
                    "Error reading videos from {}: {}",
                    self.content_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let entries = join_all(files.iter().map(|file| async move {
            let has_thumbnail = self.thumbnails.ensure_thumbnail(&file.path).await;
            catalog_entry(host, file, has_thumbnail)
        }))
        .await;

        info!("Catalog listed {} video(s)", entries.len());
        entries
    }

    /// Map a decoded identifier to a file inside the content directory.
    ///
    /// The identifier must be exactly one plain path segment. The extension
    /// of the result is empty when the name has none.
    pub async fn resolve_content(&self, file_name: &str) -> MediaResult<MediaFile> {
        let path = single_segment(&self.content_dir, file_name)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(MediaFile {
                identifier: encode_identifier(file_name),
                display_name: file_name.to_string(),
                extension: file_extension(file_name).unwrap_or_default(),
                path,
            }),
            Ok(_) => Err(MediaError::NotFound(file_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(MediaError::Io(e)),
        }
    }
}

/// Lower-cased extension of a file name, without the dot
fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()?
        .to_str()
        .map(str::to_ascii_lowercase)
}

fn single_segment(dir: &Path, file_name: &str) -> MediaResult<PathBuf> {
    let invalid = || MediaError::InvalidIdentifier(file_name.to_string());

    if file_name.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }

    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(file_name)),
        _ => Err(invalid()),
    }
}

fn catalog_entry(host: &str, file: &MediaFile, has_thumbnail: bool) -> CatalogEntry {
    let thumbnail = has_thumbnail.then(|| {
        format!(
            "http://{}/thumbs/{}",
            host,
            encode_identifier(&ThumbnailCache::thumbnail_name(&file.display_name))
        )
    });

    CatalogEntry {
        id: file.identifier.clone(),
        name: file.display_name.clone(),
        url: format!("http://{}/content/{}", host, file.identifier),
        thumbnail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StubExtractor;
    use tokio_test::assert_ok;

    fn catalog_in(root: &Path, extractor: Arc<StubExtractor>) -> MediaCatalog {
        let config = ServerConfig {
            content_dir: root.join("content"),
            thumbnail_dir: root.join("thumbs"),
            ..ServerConfig::default()
        };
        std::fs::create_dir_all(&config.content_dir).unwrap();
        MediaCatalog::from_config(&config, extractor)
    }

    fn touch(catalog: &MediaCatalog, name: &str) {
        std::fs::write(catalog.content_dir().join(name), b"video").unwrap();
    }

    #[tokio::test]
    async fn test_scan_filters_supported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_in(dir.path(), Arc::new(StubExtractor::succeeding()));
        for name in ["b.mov", "A.MP4", "c.m4v", "notes.txt", "movie.mkv", ".mp4"] {
            touch(&catalog, name);
        }
        std::fs::create_dir(catalog.content_dir().join("folder.mp4")).unwrap();

        let files = assert_ok!(catalog.scan().await);
        let names: Vec<_> = files.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, vec!["A.MP4", "b.mov", "c.m4v"]);
        assert_eq!(files[0].extension, "mp4");
    }

    #[tokio::test]
    async fn test_list_catalog_builds_urls_and_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(StubExtractor::succeeding());
        let catalog = catalog_in(dir.path(), extractor.clone());
        touch(&catalog, "clip.mp4");
        touch(&catalog, "my clip.mov");

        let entries = catalog.list_catalog("192.168.1.10:3006").await;

        assert_eq!(
            entries[0],
            CatalogEntry {
                id: "clip.mp4".to_string(),
                name: "clip.mp4".to_string(),
                url: "http://192.168.1.10:3006/content/clip.mp4".to_string(),
                thumbnail: Some("http://192.168.1.10:3006/thumbs/clip.mp4.jpg".to_string()),
            }
        );
        assert_eq!(entries[1].id, "my%20clip.mov");
        assert_eq!(
            entries[1].thumbnail.as_deref(),
            Some("http://192.168.1.10:3006/thumbs/my%20clip.mov.jpg")
        );
        assert!(catalog.thumbnails().thumbnail_path("clip.mp4").is_file());
        assert_eq!(extractor.calls(), 2);
    }

    #[tokio::test]
    async fn test_list_catalog_is_stable_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(StubExtractor::succeeding());
        let catalog = catalog_in(dir.path(), extractor.clone());
        touch(&catalog, "one.mp4");
        touch(&catalog, "two.m4v");

        let first = catalog.list_catalog("localhost:3006").await;
        let second = catalog.list_catalog("localhost:3006").await;

        assert_eq!(first, second);
        assert_eq!(extractor.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_thumbnail_yields_null() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_in(dir.path(), Arc::new(StubExtractor::failing()));
        touch(&catalog, "clip.mp4");

        let entries = catalog.list_catalog("localhost:3006").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].thumbnail, None);

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert!(json["thumbnail"].is_null());
    }

    #[tokio::test]
    async fn test_unreadable_directory_yields_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_in(dir.path(), Arc::new(StubExtractor::succeeding()));
        std::fs::remove_dir(catalog.content_dir()).unwrap();

        assert!(catalog.scan().await.is_err());
        assert!(catalog.list_catalog("localhost:3006").await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_content() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog_in(dir.path(), Arc::new(StubExtractor::succeeding()));
        for name in ["clip.mp4", "Trailer.MOV", "README"] {
            touch(&catalog, name);
        }
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        let file = assert_ok!(catalog.resolve_content("clip.mp4").await);
        assert_eq!(file.path, catalog.content_dir().join("clip.mp4"));
        assert_eq!(file.display_name, "clip.mp4");
        assert_eq!(file.extension, "mp4");

        let file = assert_ok!(catalog.resolve_content("Trailer.MOV").await);
        assert_eq!(file.extension, "mov");

        let file = assert_ok!(catalog.resolve_content("README").await);
        assert_eq!(file.extension, "");

        assert!(matches!(
            catalog.resolve_content("missing.mp4").await,
            Err(MediaError::NotFound(_))
        ));
        for name in ["", ".", "..", "../secret.txt", "../../etc/passwd", "a\\b", "/etc/passwd"] {
            assert!(
                matches!(
                    catalog.resolve_content(name).await,
                    Err(MediaError::InvalidIdentifier(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }
}
