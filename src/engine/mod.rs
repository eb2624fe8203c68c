//! Boundary to the external media engine.
//!
//! The compressor never transcodes anything itself. It hands bytes to a
//! [`MediaEngine`] through the engine's private filesystem, runs a codec command
//! line and reads the result back.
//!
//! # Architecture
//!
//! - [`MediaEngine`]: the operations the orchestration layer relies on.
//! - [`FfmpegEngine`]: binding that drives a native `ffmpeg` executable.
//! - [`EngineSession`]: lazily loaded, explicitly owned handle to one engine.

mod ffmpeg;
mod progress;
mod session;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::utils::EngineResult;

pub use ffmpeg::FfmpegEngine;
pub use progress::ProgressParser;
pub use session::EngineSession;

/// Receives the engine's progress as a ratio in `[0, 1]`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Boxed future returned by engine operations.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = EngineResult<T>> + Send + 'a>>;

/// A media-processing engine treated as a black box.
pub trait MediaEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Initialises the engine. Calling it on a loaded engine is a no-op.
    fn load(&self) -> EngineFuture<'_, ()>;

    /// Registers the callback receiving progress of subsequent runs.
    fn set_progress(&self, callback: ProgressCallback);

    /// Writes `data` into the engine filesystem under `name`.
    fn write_file<'a>(&'a self, name: &'a str, data: &'a [u8]) -> EngineFuture<'a, ()>;

    /// Reads `name` back from the engine filesystem.
    fn read_file<'a>(&'a self, name: &'a str) -> EngineFuture<'a, Vec<u8>>;

    /// Removes `name` from the engine filesystem.
    fn unlink<'a>(&'a self, name: &'a str) -> EngineFuture<'a, ()>;

    /// Runs a codec command line. Resolves with [`EngineError::Aborted`] once
    /// `cancel` fires.
    ///
    /// [`EngineError::Aborted`]: crate::utils::EngineError::Aborted
    fn run<'a>(&'a self, args: &'a [String], cancel: CancellationToken) -> EngineFuture<'a, ()>;

    /// Aborts in-flight work and releases the engine. A later `load` starts afresh.
    fn exit(&self) -> EngineFuture<'_, ()>;
}
