//! Top-level application state: one image controller, one video controller
//! and the display theme.

use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::core::MediaKind;
use crate::core::progress::TaskSnapshot;
use crate::engine::{FfmpegEngine, MediaEngine};
use crate::processing::CompressorController;
use crate::utils::CompressorResult;

pub const APP_NAME: &str = "Slimify";
pub const TAGLINE: &str = "Compress images and videos directly in your browser!";

/// Display mode. Not persisted; every shell starts light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Label of the toggle button, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark Mode",
            Self::Dark => "Light Mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLink {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub links: Vec<FooterLink>,
    pub copyright: String,
}

impl Footer {
    pub fn for_year(year: i32) -> Self {
        Self {
            links: vec![
                FooterLink { label: "Privacy Policy", href: "/privacy-policy.html" },
                FooterLink { label: "Terms & Conditions", href: "/terms-and-conditions.html" },
            ],
            copyright: format!("© {year} {APP_NAME}. All rights reserved."),
        }
    }

    pub fn current() -> Self {
        Self::for_year(chrono::Local::now().year())
    }
}

/// Everything a frontend needs to render the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub theme: Theme,
    pub theme_toggle_label: &'static str,
    pub image: TaskSnapshot,
    pub video: TaskSnapshot,
    pub footer: Footer,
}

/// Composes the two independent compressors.
///
/// Each controller owns its own engine, so image and video never share engine state.
pub struct Shell {
    image: Arc<CompressorController>,
    video: Arc<CompressorController>,
    theme: Theme,
}

impl Shell {
    pub fn new(image_engine: Arc<dyn MediaEngine>, video_engine: Arc<dyn MediaEngine>, config: &AppConfig) -> Self {
        Self {
            image: Arc::new(CompressorController::new(
                MediaKind::Image,
                image_engine,
                config.settings_for(MediaKind::Image),
            )),
            video: Arc::new(CompressorController::new(
                MediaKind::Video,
                video_engine,
                config.settings_for(MediaKind::Video),
            )),
            theme: Theme::default(),
        }
    }

    /// Shell backed by two native ffmpeg engines.
    pub fn with_ffmpeg(config: &AppConfig) -> Self {
        debug!("Using ffmpeg at {}", config.ffmpeg_path.display());
        Self::new(
            Arc::new(FfmpegEngine::new(&config.ffmpeg_path)),
            Arc::new(FfmpegEngine::new(&config.ffmpeg_path)),
            config,
        )
    }

    pub fn image(&self) -> &Arc<CompressorController> {
        &self.image
    }

    pub fn video(&self) -> &Arc<CompressorController> {
        &self.video
    }

    pub fn controller(&self, kind: MediaKind) -> &Arc<CompressorController> {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn view(&self) -> ShellView {
        ShellView {
            title: APP_NAME,
            tagline: TAGLINE,
            theme: self.theme,
            theme_toggle_label: self.theme.toggle_label(),
            image: self.image.snapshot(),
            video: self.video.snapshot(),
            footer: Footer::current(),
        }
    }

    /// Cancels running tasks and tears down both engines.
    pub async fn shutdown(&self) -> CompressorResult<()> {
        let (image, video) = tokio::join!(self.image.shutdown(), self.video.shutdown());
        image.and(video)
    }
}
