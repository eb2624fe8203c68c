//! Compression task definition and the files it operates on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{CompressionStats, OutputBlob, VideoMode};
use crate::utils::{CompressorResult, mime_from_path};

/// Where a source file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceData {
    Disk(PathBuf),
    Memory(Arc<[u8]>),
}

/// A user-selected file: name, byte size, declared MIME type and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    size: u64,
    mime: String,
    data: SourceData,
}

impl SourceFile {
    /// Opens a file on disk, deriving the declared MIME type from its extension.
    pub async fn open(path: impl AsRef<Path>) -> CompressorResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            size: metadata.len(),
            mime: mime_from_path(path).to_string(),
            data: SourceData::Disk(path.to_path_buf()),
        })
    }

    /// Wraps an in-memory buffer with an explicitly declared MIME type.
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime: mime.into(),
            data: SourceData::Memory(bytes.into()),
        }
    }

    /// Declares a size without holding the bytes. Reading it yields an empty buffer.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Path on disk, if the file was opened from one.
    pub fn path(&self) -> Option<&Path> {
        match &self.data {
            SourceData::Disk(path) => Some(path),
            SourceData::Memory(_) => None,
        }
    }

    pub async fn read_bytes(&self) -> CompressorResult<Vec<u8>> {
        match &self.data {
            SourceData::Disk(path) => Ok(tokio::fs::read(path).await?),
            SourceData::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Lifecycle phase of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPhase {
    #[default]
    Idle,
    Loading,
    Running,
    Done,
    Failed,
    Canceled,
}

impl TaskPhase {
    /// Loading and running both occupy the controller.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading | Self::Running)
    }
}

/// One compression attempt and its visible state.
#[derive(Debug, Clone, Default)]
pub struct Task {
    pub id: Option<Uuid>,
    pub file: Option<SourceFile>,
    pub mode: Option<VideoMode>,
    pub phase: TaskPhase,
    /// Percentage 0-100
    pub progress: u8,
    pub status: String,
    pub output: Option<OutputBlob>,
    pub stats: Option<CompressionStats>,
    /// Underlying error of the last failure, for logs and the CLI
    pub error: Option<String>,
}

impl Task {
    /// Creates an idle task for a freshly selected file.
    pub fn for_file(file: SourceFile, mode: Option<VideoMode>) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            file: Some(file),
            mode,
            ..Self::default()
        }
    }

    /// Drops everything produced by a previous run.
    pub fn clear_results(&mut self) {
        self.progress = 0;
        self.output = None;
        self.stats = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_source_reports_its_length() {
        let file = SourceFile::from_bytes("clip.mp4", "video/mp4", vec![0; 42]);
        assert_eq!(file.size(), 42);
        assert_eq!(file.mime(), "video/mp4");
        assert!(file.path().is_none());
    }

    #[test]
    fn busy_phases() {
        assert!(TaskPhase::Loading.is_busy());
        assert!(TaskPhase::Running.is_busy());
        assert!(!TaskPhase::Done.is_busy());
        assert!(!TaskPhase::Idle.is_busy());
    }

    #[tokio::test]
    async fn opens_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.PNG");
        std::fs::write(&path, b"pixels").unwrap();

        let file = SourceFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "photo.PNG");
        assert_eq!(file.size(), 6);
        assert_eq!(file.mime(), "image/png");
        assert_eq!(file.read_bytes().await.unwrap(), b"pixels");
    }
}
