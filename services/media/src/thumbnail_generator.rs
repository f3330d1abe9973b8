use anyhow::Result;
use async_trait::async_trait;
use common::ServerConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, error, info, warn};

/// Produces a single still frame of a video as an image file.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frame(&self, video_path: &Path, thumbnail_path: &Path) -> Result<()>;
}

/// Frame extractor backed by the `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    ffmpeg_path: String,
    width: u32,
    height: u32,
    offset: String,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg_path: String, width: u32, height: u32, offset: String) -> Self {
        Self {
            ffmpeg_path,
            width,
            height,
            offset,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            config.thumbnail_width,
            config.thumbnail_height,
            config.thumbnail_offset.clone(),
        )
    }
}

#[async_trait]
impl FrameExtractor for FfmpegExtractor {
    async fn extract_frame(&self, video_path: &Path, thumbnail_path: &Path) -> Result<()> {
        // Grab one frame a little after the start to skip black leaders
        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(video_path)
            .arg("-ss")
            .arg(&self.offset)
            .arg("-vframes")
            .arg("1")
            .arg("-s")
            .arg(format!("{}x{}", self.width, self.height))
            .arg("-f")
            .arg("image2")
            .arg("-y")
            .arg(thumbnail_path)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr.lines().last().unwrap_or_default();
            error!("FFmpeg failed with status {:?}: {}", output.status, tail);
            return Err(anyhow::anyhow!("FFmpeg failed"));
        }

        Ok(())
    }
}

type Waiters = HashMap<String, Vec<oneshot::Sender<bool>>>;

/// On-disk cache of preview images, keyed by the source file name.
///
/// A preview exists exactly when `<file name>.jpg` is present in the
/// thumbnail directory. Concurrent requests for the same missing preview
/// share a single extractor run.
#[derive(Clone)]
pub struct ThumbnailCache {
    thumbnail_dir: PathBuf,
    extractor: Arc<dyn FrameExtractor>,
    in_flight: Arc<Mutex<Waiters>>,
}

impl ThumbnailCache {
    pub fn new(thumbnail_dir: PathBuf, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self {
            thumbnail_dir,
            extractor,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn thumbnail_dir(&self) -> &Path {
        &self.thumbnail_dir
    }

    /// File name of the preview for a media file name
    pub fn thumbnail_name(file_name: &str) -> String {
        format!("{}.jpg", file_name)
    }

    pub fn thumbnail_path(&self, file_name: &str) -> PathBuf {
        self.thumbnail_dir.join(Self::thumbnail_name(file_name))
    }

    pub async fn has_thumbnail(&self, file_name: &str) -> bool {
        tokio::fs::metadata(self.thumbnail_path(file_name))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Make sure a preview exists for the media file at `media_path`.
    ///
    /// Returns `true` when the preview is present afterwards, `false` when
    /// generation failed. Failures are logged and never surface as errors.
    pub async fn ensure_thumbnail(&self, media_path: &Path) -> bool {
        let Some(file_name) = media_path.file_name().and_then(|name| name.to_str()) else {
            warn!("Cannot derive a thumbnail name for {}", media_path.display());
            return false;
        };

        if self.has_thumbnail(file_name).await {
            debug!("Thumbnail cache hit for {}", file_name);
            return true;
        }

        let (tx, rx) = oneshot::channel();
        let first = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get_mut(file_name) {
                Some(waiters) => {
                    waiters.push(tx);
                    false
                }
                None => {
                    in_flight.insert(file_name.to_string(), vec![tx]);
                    true
                }
            }
        };

        if first {
            // Detached so that waiters still get an answer if this request goes away
            let cache = self.clone();
            let media_path = media_path.to_path_buf();
            let file_name = file_name.to_string();
            tokio::spawn(async move {
                let generation = {
                    let cache = cache.clone();
                    let file_name = file_name.clone();
                    tokio::spawn(async move { cache.generate(&media_path, &file_name).await })
                };
                // A panicking extractor must still release the waiters
                let generated = match generation.await {
                    Ok(generated) => generated,
                    Err(e) => {
                        error!("Thumbnail generation for {} aborted: {}", file_name, e);
                        false
                    }
                };
                let waiters = cache
                    .in_flight
                    .lock()
                    .await
                    .remove(&file_name)
                    .unwrap_or_default();
                for waiter in waiters {
                    let _ = waiter.send(generated);
                }
            });
        } else {
            debug!("Waiting for in-flight thumbnail generation of {}", file_name);
        }

        rx.await.unwrap_or(false)
    }

    async fn generate(&self, media_path: &Path, file_name: &str) -> bool {
        // Another generation may have finished between the check and the claim
        if self.has_thumbnail(file_name).await {
            return true;
        }

        info!("Generating thumbnail for video: {}", file_name);

        let target = self.thumbnail_path(file_name);
        let partial = self
            .thumbnail_dir
            .join(format!("{}.part", Self::thumbnail_name(file_name)));

        match self.extract_into(media_path, &partial, &target).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error generating thumbnail for {}: {:#}", file_name, e);
                let _ = tokio::fs::remove_file(&partial).await;
                false
            }
        }
    }

    async fn extract_into(&self, media_path: &Path, partial: &Path, target: &Path) -> Result<()> {
        tokio::fs::create_dir_all(&self.thumbnail_dir).await?;
        self.extractor.extract_frame(media_path, partial).await?;
        tokio::fs::rename(partial, target).await?;
        Ok(())
    }
}
