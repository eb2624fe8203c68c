//! Application configuration.
//!
//! Defaults are overridden by an optional JSON file, then by environment
//! variables; the CLI applies its own flags last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::MediaKind;
use crate::utils::{CompressorError, CompressorResult};

/// Environment variable naming the ffmpeg executable.
pub const FFMPEG_ENV: &str = "SLIMIFY_FFMPEG";

/// Largest accepted video, 500 MiB.
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// ffmpeg executable, looked up on PATH when not absolute
    pub ffmpeg_path: PathBuf,
    /// Largest accepted video in bytes
    pub max_video_bytes: u64,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, the optional JSON file at `path`, then environment overrides.
    pub async fn load(path: Option<&Path>) -> CompressorResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    CompressorError::config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                debug!("Loaded config from {}", path.display());
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> CompressorResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    fn apply_env(&mut self) {
        if let Some(path) = std::env::var_os(FFMPEG_ENV).filter(|v| !v.is_empty()) {
            self.ffmpeg_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> CompressorResult<()> {
        if self.max_video_bytes == 0 {
            return Err(CompressorError::config("Video size limit cannot be 0"));
        }
        Ok(())
    }

    /// Per-controller settings derived from this configuration.
    pub fn settings_for(&self, kind: MediaKind) -> CompressorSettings {
        CompressorSettings {
            max_bytes: match kind {
                MediaKind::Image => None,
                MediaKind::Video => Some(self.max_video_bytes),
            },
        }
    }
}

/// Settings a single controller runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressorSettings {
    /// Size limit checked on file selection, if any
    pub max_bytes: Option<u64>,
}

impl CompressorSettings {
    pub fn defaults_for(kind: MediaKind) -> Self {
        AppConfig::default().settings_for(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "logFilter": "warn" }"#).unwrap();
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.max_video_bytes, DEFAULT_MAX_VIDEO_BYTES);
    }

    #[test]
    fn codec_settings_are_not_configurable() {
        let config = AppConfig::from_json(r#"{ "crf": 23, "imageQuality": 2 }"#).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn rejects_zero_size_limit() {
        let config = AppConfig { max_video_bytes: 0, ..AppConfig::default() };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn only_video_has_a_size_limit() {
        let config = AppConfig::default();
        assert_eq!(config.settings_for(MediaKind::Image).max_bytes, None);
        assert_eq!(config.settings_for(MediaKind::Video).max_bytes, Some(524_288_000));
    }

    #[tokio::test]
    async fn loads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slimify.json");
        std::fs::write(&path, r#"{ "maxVideoBytes": 1024, "logFilter": "debug" }"#).unwrap();

        let config = AppConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.max_video_bytes, 1024);
        assert_eq!(config.log_filter, "debug");
    }

    #[tokio::test]
    async fn missing_config_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/slimify.json"))).await.unwrap_err();
        assert!(matches!(err, CompressorError::Config(_)));
    }
}
