//! Server configuration
//!
//! Settings are layered: built-in defaults, an optional `vod-server` config
//! file in the working directory, then `VOD_*` environment variables.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};

/// Name of the optional configuration file (any format `config` understands)
pub const CONFIG_FILE_NAME: &str = "vod-server";

/// Prefix for environment overrides, e.g. `VOD_PORT=8080`
pub const ENV_PREFIX: &str = "VOD";

/// Configuration for the video server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the playable media
    pub content_dir: PathBuf,
    /// Directory holding generated preview images
    pub thumbnail_dir: PathBuf,
    /// File extensions eligible for the catalog, lower-case without the dot
    pub supported_extensions: Vec<String>,
    /// Frame extractor binary
    pub ffmpeg_path: String,
    /// Preview width in pixels
    pub thumbnail_width: u32,
    /// Preview height in pixels
    pub thumbnail_height: u32,
    /// Seek position of the preview frame, in ffmpeg time syntax
    pub thumbnail_offset: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3006,
            content_dir: PathBuf::from("vod_content"),
            thumbnail_dir: PathBuf::from("thumbnails"),
            supported_extensions: vec!["mp4".to_string(), "mov".to_string(), "m4v".to_string()],
            ffmpeg_path: "ffmpeg".to_string(),
            thumbnail_width: 320,
            thumbnail_height: 180,
            thumbnail_offset: "00:00:01".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load the configuration from the config file in the working directory
    /// and the environment
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load the configuration, reading the optional config file at `file`
    pub fn load_from(file: &Path) -> ConfigResult<Self> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("content_dir", defaults.content_dir.to_string_lossy().into_owned())?
            .set_default(
                "thumbnail_dir",
                defaults.thumbnail_dir.to_string_lossy().into_owned(),
            )?
            .set_default("supported_extensions", defaults.supported_extensions)?
            .set_default("ffmpeg_path", defaults.ffmpeg_path)?
            .set_default("thumbnail_width", i64::from(defaults.thumbnail_width))?
            .set_default("thumbnail_height", i64::from(defaults.thumbnail_height))?
            .set_default("thumbnail_offset", defaults.thumbnail_offset)?
            .add_source(File::with_name(&file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("supported_extensions"),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.supported_extensions = normalize_extensions(&config.supported_extensions);
        Ok(config)
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the content and thumbnail directories if they are missing
    pub fn prepare_directories(&self) -> ConfigResult<()> {
        for dir in [&self.content_dir, &self.thumbnail_dir] {
            if !dir.is_dir() {
                std::fs::create_dir_all(dir).map_err(|source| ConfigError::Directory {
                    path: dir.clone(),
                    source,
                })?;
                info!("Created directory {}", dir.display());
            }
        }
        Ok(())
    }
}

/// Lower-case the extensions and strip any leading dot
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    normalized.dedup();
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn missing_file() -> PathBuf {
        PathBuf::from("definitely-not-a-config-file")
    }

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        let config = ServerConfig::load_from(&missing_file()).unwrap();
        assert_eq!(config.port, 3006);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.content_dir, PathBuf::from("vod_content"));
        assert_eq!(config.thumbnail_dir, PathBuf::from("thumbnails"));
        assert_eq!(config.supported_extensions, vec!["mp4", "mov", "m4v"]);
        assert_eq!(config.bind_address(), "0.0.0.0:3006");
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        unsafe {
            std::env::set_var("VOD_PORT", "8080");
            std::env::set_var("VOD_CONTENT_DIR", "/srv/videos");
            std::env::set_var("VOD_SUPPORTED_EXTENSIONS", ".MP4,mkv");
        }

        let config = ServerConfig::load_from(&missing_file()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.content_dir, PathBuf::from("/srv/videos"));
        assert_eq!(config.supported_extensions, vec!["mp4", "mkv"]);

        unsafe {
            std::env::remove_var("VOD_PORT");
            std::env::remove_var("VOD_CONTENT_DIR");
            std::env::remove_var("VOD_SUPPORTED_EXTENSIONS");
        }
    }

    #[test]
    #[serial]
    fn test_server_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("vod-server.toml");
        std::fs::write(&file, "port = 4000\nffmpeg_path = \"/opt/ffmpeg\"\n").unwrap();

        let config = ServerConfig::load_from(&dir.path().join("vod-server")).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(config.thumbnail_width, 320);
    }

    #[test]
    fn test_prepare_directories_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            content_dir: dir.path().join("content"),
            thumbnail_dir: dir.path().join("nested/thumbs"),
            ..ServerConfig::default()
        };

        config.prepare_directories().unwrap();
        assert!(config.content_dir.is_dir());
        assert!(config.thumbnail_dir.is_dir());

        // Second call is a no-op
        config.prepare_directories().unwrap();
    }
}
