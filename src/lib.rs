// Module declarations in dependency order
pub mod config;
pub mod core;
pub mod engine;
pub mod processing;
pub mod commands;
pub mod utils;

// Public exports for external consumers
pub use config::{AppConfig, CompressorSettings};
pub use crate::core::{
    CompressionStats, MediaKind, OutputBlob, Shell, ShellView, SourceFile, TaskPhase, TaskSnapshot,
    Theme, VideoMode,
};
pub use engine::{EngineSession, FfmpegEngine, MediaEngine, ProgressCallback};
pub use processing::CompressorController;
pub use utils::{CompressorError, CompressorResult, EngineError, ValidationError};
pub use commands::*;
