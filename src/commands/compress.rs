//! One-shot compression commands.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::core::{CompressionStats, MediaKind, SourceFile, TaskPhase, VideoMode};
use crate::processing::CompressorController;
use crate::utils::{CompressorError, CompressorResult, EngineError, default_output_path, save_blob};

/// Outcome of a saved compression.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    pub kind: MediaKind,
    /// Path to the original input file
    pub input_path: String,
    /// Path where the compressed result was written
    pub output_path: String,
    pub mode: Option<VideoMode>,
    pub stats: CompressionStats,
}

/// Compresses an image file on disk.
///
/// # Arguments
/// * `controller` - Image controller owning the engine session
/// * `input` - Path to the source image
/// * `output` - Destination; defaults to `compressed.jpg` next to the input
pub async fn compress_image(
    controller: &CompressorController,
    input: &Path,
    output: Option<PathBuf>,
) -> CompressorResult<CompressionReport> {
    compress_file(controller, input, None, output).await
}

/// Compresses a video file on disk with the given mode.
pub async fn compress_video(
    controller: &CompressorController,
    input: &Path,
    mode: VideoMode,
    output: Option<PathBuf>,
) -> CompressorResult<CompressionReport> {
    compress_file(controller, input, Some(mode), output).await
}

/// Selects `input`, runs the controller to a terminal phase and saves the result.
pub async fn compress_file(
    controller: &CompressorController,
    input: &Path,
    mode: Option<VideoMode>,
    output: Option<PathBuf>,
) -> CompressorResult<CompressionReport> {
    let file = SourceFile::open(input).await?;
    controller.select_file(file)?;
    if let Some(mode) = mode {
        controller.set_mode(mode)?;
    }

    let phase = controller.start().await?;
    let snapshot = controller.snapshot();
    debug!("{} task ended in phase {:?}", controller.kind(), phase);

    match phase {
        TaskPhase::Done => {}
        TaskPhase::Canceled => return Err(EngineError::Aborted.into()),
        _ => {
            let message = snapshot.error.unwrap_or(snapshot.status);
            return Err(EngineError::run(message).into());
        }
    }

    let (blob, stats) = controller
        .output()
        .zip(snapshot.stats)
        .ok_or_else(|| CompressorError::from(EngineError::run("Finished task has no output")))?;

    let output_path = output.unwrap_or_else(|| default_output_path(Some(input), &blob));
    save_blob(&blob, &output_path).await?;
    debug!("Saved {} bytes to {}", blob.len(), output_path.display());

    Ok(CompressionReport {
        kind: controller.kind(),
        input_path: input.to_string_lossy().to_string(),
        output_path: output_path.to_string_lossy().to_string(),
        mode: controller.mode(),
        stats,
    })
}
