//! Engine binding that drives a native `ffmpeg` executable.
//!
//! The engine filesystem is a private temporary directory created on `load` and
//! removed on `exit` (or when the engine is dropped). Every `run` spawns the
//! executable inside that directory so the fixed file names resolve there.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{EngineFuture, MediaEngine, ProgressCallback, ProgressParser};
use crate::utils::{EngineError, EngineResult};

/// Flags prepended to every command line: no banner, never read stdin, overwrite outputs.
const ENGINE_FLAGS: [&str; 3] = ["-hide_banner", "-nostdin", "-y"];

/// Number of trailing log lines kept for error messages.
const LOG_TAIL: usize = 8;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FfmpegEngine {
    binary: PathBuf,
    workdir: Mutex<Option<TempDir>>,
    progress: Mutex<Option<ProgressCallback>>,
    shutdown: Mutex<CancellationToken>,
}

impl FfmpegEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: Mutex::new(None),
            progress: Mutex::new(None),
            shutdown: Mutex::new(CancellationToken::new()),
        }
    }

    /// Directory backing the engine filesystem, if loaded.
    pub fn workdir(&self) -> Option<PathBuf> {
        lock(&self.workdir).as_ref().map(|dir| dir.path().to_path_buf())
    }

    fn resolve(&self, name: &str) -> EngineResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(EngineError::fs(name, "invalid file name"));
        }
        let dir = self.workdir().ok_or(EngineError::NotLoaded)?;
        Ok(dir.join(name))
    }

    async fn probe(&self) -> EngineResult<String> {
        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EngineError::Load(format!(
                "Failed to run {}: {}", self.binary.display(), e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Load(format!(
                "{} -version exited with {}: {}", self.binary.display(), output.status, stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }
}

impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn load(&self) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            if self.workdir().is_some() {
                return Ok(());
            }

            let version = self.probe().await?;
            debug!("Found {}", version);

            let dir = tempfile::Builder::new()
                .prefix("slimify-")
                .tempdir()
                .map_err(|e| EngineError::Load(format!("Cannot create engine directory: {e}")))?;
            debug!("Engine filesystem at {}", dir.path().display());

            *lock(&self.workdir) = Some(dir);
            *lock(&self.shutdown) = CancellationToken::new();
            Ok(())
        })
    }

    fn set_progress(&self, callback: ProgressCallback) {
        *lock(&self.progress) = Some(callback);
    }

    fn write_file<'a>(&'a self, name: &'a str, data: &'a [u8]) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            let path = self.resolve(name)?;
            tokio::fs::write(&path, data)
                .await
                .map_err(|e| EngineError::fs(name, e))
        })
    }

    fn read_file<'a>(&'a self, name: &'a str) -> EngineFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = self.resolve(name)?;
            tokio::fs::read(&path)
                .await
                .map_err(|e| EngineError::fs(name, e))
        })
    }

    fn unlink<'a>(&'a self, name: &'a str) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            let path = self.resolve(name)?;
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| EngineError::fs(name, e))
        })
    }

    fn run<'a>(&'a self, args: &'a [String], cancel: CancellationToken) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            let dir = self.workdir().ok_or(EngineError::NotLoaded)?;
            let exit = lock(&self.shutdown).clone();
            let progress = lock(&self.progress).clone();
            let on_complete = progress.clone();

            debug!("Running ffmpeg with args: {:?}", args);
            let mut child = Command::new(&self.binary)
                .args(ENGINE_FLAGS)
                .args(args)
                .current_dir(&dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| EngineError::run(format!("Failed to spawn ffmpeg: {e}")))?;

            // Read stderr for progress
            let stderr = child.stderr.take();
            let reader = tokio::spawn(async move {
                let mut tail = VecDeque::with_capacity(LOG_TAIL);
                let Some(stderr) = stderr else {
                    return tail;
                };
                let mut parser = ProgressParser::new();
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let (Some(ratio), Some(callback)) = (parser.feed(&line), progress.as_ref()) {
                        callback(ratio);
                    }
                    if tail.len() == LOG_TAIL {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            });

            let status = tokio::select! {
                status = child.wait() => Some(status),
                _ = cancel.cancelled() => None,
                _ = exit.cancelled() => None,
            };

            let Some(status) = status else {
                debug!("Aborting ffmpeg run");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill ffmpeg: {}", e);
                }
                reader.abort();
                return Err(EngineError::Aborted);
            };

            let status = status.map_err(|e| EngineError::run(format!("FFmpeg process error: {e}")))?;
            let tail = reader.await.unwrap_or_default();

            if !status.success() {
                let log = Vec::from(tail).join("\n");
                return Err(EngineError::run(format!("ffmpeg exited with {status}: {log}")));
            }

            if let Some(callback) = on_complete {
                callback(1.0);
            }
            Ok(())
        })
    }

    fn exit(&self) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            lock(&self.shutdown).cancel();
            // Dropping the TempDir removes the engine filesystem.
            if let Some(dir) = lock(&self.workdir).take() {
                debug!("Removing engine filesystem at {}", dir.path().display());
            }
            Ok(())
        })
    }
}
