use serde::Serialize;
use uuid::Uuid;

use crate::core::task::{Task, TaskPhase};
use crate::core::types::{CompressionStats, MediaKind, VideoMode};

/// Maps an engine progress ratio in `[0, 1]` to a whole percentage.
pub fn ratio_to_percent(ratio: f64) -> u8 {
    if !ratio.is_finite() {
        return 0;
    }
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Serializable view of a controller's current task, broadcast on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub kind: MediaKind,
    pub task_id: Option<Uuid>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub mode: Option<VideoMode>,
    pub phase: TaskPhase,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Current status message
    pub status: String,
    pub has_output: bool,
    pub output_size: Option<u64>,
    pub stats: Option<CompressionStats>,
    pub error: Option<String>,
}

impl TaskSnapshot {
    pub fn idle(kind: MediaKind) -> Self {
        Self::from_task(kind, &Task::default())
    }

    pub fn from_task(kind: MediaKind, task: &Task) -> Self {
        Self {
            kind,
            task_id: task.id,
            file_name: task.file.as_ref().map(|f| f.name().to_string()),
            file_size: task.file.as_ref().map(|f| f.size()),
            mode: task.mode,
            phase: task.phase,
            progress: task.progress,
            status: task.status.clone(),
            has_output: task.output.is_some(),
            output_size: task.output.as_ref().map(|o| o.len()),
            stats: task.stats,
            error: task.error.clone(),
        }
    }

    /// Text for the progress bar: the percentage while busy, the status message otherwise.
    pub fn display_text(&self) -> String {
        if self.phase.is_busy() {
            format!("{}%", self.progress)
        } else {
            self.status.clone()
        }
    }

    /// Width of the progress bar in percent.
    pub fn bar_width(&self) -> u8 {
        if self.phase.is_busy() { self.progress } else { 100 }
    }
}
