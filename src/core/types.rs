//! Core types for compression modes, outputs and results.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::utils::CompressorError;

/// The media category a controller is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Top-level MIME type accepted by this kind (`image` for `image/*`).
    pub fn mime_category(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Returns true if `mime` falls under this kind's category.
    pub fn accepts(&self, mime: &str) -> bool {
        mime.split_once('/')
            .map(|(top, sub)| top.eq_ignore_ascii_case(self.mime_category()) && !sub.is_empty())
            .unwrap_or(false)
    }

    /// Fixed name of the source file inside the engine filesystem.
    pub fn input_name(&self) -> &'static str {
        match self {
            Self::Image => "input.png",
            Self::Video => "input.mp4",
        }
    }

    /// Fixed name of the result file inside the engine filesystem.
    pub fn output_name(&self) -> &'static str {
        match self {
            Self::Image => "output.jpg",
            Self::Video => "output.mp4",
        }
    }

    pub fn output_mime(&self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Video => "video/mp4",
        }
    }

    /// Suggested filename when the result is downloaded.
    pub fn download_name(&self) -> &'static str {
        match self {
            Self::Image => "compressed.jpg",
            Self::Video => "compressed.mp4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }

    /// Whether the engine's input and output files are removed after a successful run.
    pub fn cleans_up_after_run(&self) -> bool {
        matches!(self, Self::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_category())
    }
}

/// Video speed/quality tradeoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoMode {
    #[default]
    Fast,
    Balanced,
    High,
}

/// Encoder settings a [`VideoMode`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePreset {
    /// x264 `-preset` value
    pub preset: &'static str,
    /// `-x264-params` tuning string
    pub tuning: &'static str,
    /// Target video bitrate (`-b:v`)
    pub bitrate: &'static str,
}

/// Static mode table.
pub const MODE_PRESETS: [(VideoMode, ModePreset); 3] = [
    (
        VideoMode::Fast,
        ModePreset {
            preset: "ultrafast",
            tuning: "ref=1:subme=1:me=dia:trellis=0:fast_pskip=1",
            bitrate: "1000k",
        },
    ),
    (
        VideoMode::Balanced,
        ModePreset {
            preset: "medium",
            tuning: "ref=3:subme=6:me=hex:trellis=1",
            bitrate: "2000k",
        },
    ),
    (
        VideoMode::High,
        ModePreset {
            preset: "slow",
            tuning: "ref=5:subme=8:me=umh:trellis=2",
            bitrate: "3000k",
        },
    ),
];

impl VideoMode {
    pub const ALL: [VideoMode; 3] = [VideoMode::Fast, VideoMode::Balanced, VideoMode::High];

    pub fn preset(&self) -> &'static ModePreset {
        // Every variant has exactly one row in MODE_PRESETS, in declaration order.
        &MODE_PRESETS[*self as usize].1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::High => "high",
        }
    }

    /// Label shown in the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fast => "⚡ Fast",
            Self::Balanced => "⚖️ Balanced",
            Self::High => "🎥 High Quality",
        }
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoMode {
    type Err = CompressorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "high" => Ok(Self::High),
            other => Err(CompressorError::unsupported(format!(
                "Unknown compression mode: {}", other
            ))),
        }
    }
}

/// Compressed bytes held in memory until they are saved or discarded.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputBlob {
    bytes: Arc<[u8]>,
    mime: &'static str,
    file_name: &'static str,
}

impl OutputBlob {
    pub fn new(kind: MediaKind, bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: kind.output_mime(),
            file_name: kind.download_name(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Suggested filename for downloads.
    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

impl fmt::Debug for OutputBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputBlob")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Size statistics of a finished compression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    /// Source size in bytes
    pub original_size: u64,
    /// Result size in bytes
    pub compressed_size: u64,
    /// Bytes saved (negative if the file grew)
    pub saved_bytes: i64,
    /// Saved bytes as a percentage of the original size
    pub compression_ratio: f64,
}

impl CompressionStats {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        let saved_bytes = original_size as i64 - compressed_size as i64;
        let compression_ratio = if original_size > 0 {
            saved_bytes as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };

        Self {
            original_size,
            compressed_size,
            saved_bytes,
            compression_ratio,
        }
    }
}
