//! Per-media-kind compression controller.
//!
//! A controller owns one [`EngineSession`] and the state of one task at a time:
//! idle → loading → running → done | failed | canceled. Every state change is
//! published as a [`TaskSnapshot`] on a watch channel.
//!
//! Each `start` gets its own [`CancellationToken`]. `cancel` and a new file
//! selection fire it, which aborts the engine run and makes the still-pending
//! `start` discard whatever it eventually produces.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::CompressorSettings;
use crate::core::{
    CompressionStats, MediaKind, OutputBlob, SourceFile, Task, TaskPhase, TaskSnapshot, VideoMode,
    ratio_to_percent,
};
use crate::engine::{EngineSession, MediaEngine, ProgressCallback};
use crate::processing::args::build_args;
use crate::processing::validation::{rejection_message, validate_selection};
use crate::utils::{CompressorError, CompressorResult, EngineError, ValidationError};

pub const STATUS_COMPRESSING: &str = "Compressing...";
pub const STATUS_COMPLETED: &str = "Compression completed ✅";
pub const STATUS_FAILED: &str = "Compression failed ❌";
pub const STATUS_LOAD_FAILED: &str = "Failed to load compression engine ❌";

pub fn canceled_status(kind: MediaKind) -> String {
    format!("Compression canceled OR {} removed", kind.label())
}

#[derive(Debug, Error)]
enum RunFailure {
    #[error("{0}")]
    Load(EngineError),
    #[error("{0}")]
    Run(CompressorError),
}

impl From<EngineError> for RunFailure {
    fn from(err: EngineError) -> Self {
        Self::Run(err.into())
    }
}

impl From<CompressorError> for RunFailure {
    fn from(err: CompressorError) -> Self {
        Self::Run(err)
    }
}

struct ControllerState {
    task: Task,
    /// Bumped by every start, selection and cancel; a pending start only
    /// settles if the generation it began with is still current.
    generation: u64,
    cancel: CancellationToken,
    /// Generation of the task currently holding the engine; only its
    /// progress reports are shown.
    engine_owner: Option<u64>,
    /// Mode for the next video run
    mode: VideoMode,
}

struct Shared {
    kind: MediaKind,
    state: Mutex<ControllerState>,
    updates: watch::Sender<TaskSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `f` to the state and publishes the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.updates.send_replace(TaskSnapshot::from_task(self.kind, &state.task));
        result
    }

    fn on_progress(&self, ratio: f64) {
        let mut state = self.lock();
        if state.cancel.is_cancelled()
            || state.engine_owner != Some(state.generation)
            || state.task.phase != TaskPhase::Running
        {
            return;
        }
        let percent = ratio_to_percent(ratio);
        if percent <= state.task.progress {
            return;
        }
        state.task.progress = percent;
        self.updates.send_replace(TaskSnapshot::from_task(self.kind, &state.task));
    }

    fn claim_engine(&self, generation: u64) {
        self.lock().engine_owner = Some(generation);
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), RunFailure> {
    if cancel.is_cancelled() {
        return Err(EngineError::Aborted.into());
    }
    Ok(())
}

pub struct CompressorController {
    kind: MediaKind,
    settings: CompressorSettings,
    session: EngineSession,
    shared: Arc<Shared>,
}

impl CompressorController {
    pub fn new(kind: MediaKind, engine: Arc<dyn MediaEngine>, settings: CompressorSettings) -> Self {
        let mode = VideoMode::default();
        let task = Task {
            mode: Self::mode_for(kind, mode),
            ..Task::default()
        };
        let (updates, _) = watch::channel(TaskSnapshot::from_task(kind, &task));
        let shared = Arc::new(Shared {
            kind,
            state: Mutex::new(ControllerState {
                task,
                generation: 0,
                cancel: CancellationToken::new(),
                engine_owner: None,
                mode,
            }),
            updates,
        });

        let progress: ProgressCallback = {
            let shared = Arc::clone(&shared);
            Arc::new(move |ratio| shared.on_progress(ratio))
        };

        Self {
            kind,
            settings,
            session: EngineSession::new(engine, progress),
            shared,
        }
    }

    /// Image controller with default settings.
    pub fn image(engine: Arc<dyn MediaEngine>) -> Self {
        Self::new(MediaKind::Image, engine, CompressorSettings::defaults_for(MediaKind::Image))
    }

    /// Video controller with default settings.
    pub fn video(engine: Arc<dyn MediaEngine>) -> Self {
        Self::new(MediaKind::Video, engine, CompressorSettings::defaults_for(MediaKind::Video))
    }

    fn mode_for(kind: MediaKind, mode: VideoMode) -> Option<VideoMode> {
        match kind {
            MediaKind::Image => None,
            MediaKind::Video => Some(mode),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_engine_loaded(&self) -> bool {
        self.session.is_loaded()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// Receives a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Result of the current task; only present once it is done.
    pub fn output(&self) -> Option<OutputBlob> {
        self.shared.lock().task.output.clone()
    }

    pub fn mode(&self) -> Option<VideoMode> {
        Self::mode_for(self.kind, self.shared.lock().mode)
    }

    /// Selects the mode for the next video run.
    pub fn set_mode(&self, mode: VideoMode) -> CompressorResult<()> {
        if self.kind != MediaKind::Video {
            return Err(CompressorError::unsupported("Compression modes only apply to video"));
        }
        self.shared.update(|s| {
            s.mode = mode;
            if !s.task.phase.is_busy() {
                s.task.mode = Some(mode);
            }
        });
        Ok(())
    }

    /// Selects a new source file, replacing whatever task came before.
    ///
    /// A rejected file leaves the current task untouched apart from its status
    /// message, and never reaches the engine.
    pub fn select_file(&self, file: SourceFile) -> CompressorResult<()> {
        if let Err(err) = validate_selection(self.kind, &file, &self.settings) {
            warn!("Rejected {} file '{}': {}", self.kind, file.name(), err);
            let message = rejection_message(self.kind, &err);
            self.shared.update(|s| {
                if !s.task.phase.is_busy() {
                    s.task.status = message;
                }
            });
            return Err(err.into());
        }

        debug!("Selected {} file '{}' ({} bytes)", self.kind, file.name(), file.size());
        self.shared.update(|s| {
            if s.task.phase.is_busy() {
                debug!("New selection supersedes the running {} task", self.kind);
            }
            s.cancel.cancel();
            s.generation += 1;
            s.task = Task::for_file(file, Self::mode_for(self.kind, s.mode));
        });
        Ok(())
    }

    /// Compresses the selected file and resolves with the phase the task ended in.
    ///
    /// Returns [`CompressorError::Busy`] without touching the engine while a
    /// task is loading or running. Engine failures are reported through the
    /// task state, not as an error.
    pub async fn start(&self) -> CompressorResult<TaskPhase> {
        let loaded = self.session.is_loaded();
        let (generation, cancel, file, mode) = self.shared.update(|s| {
            if s.task.phase.is_busy() {
                return Err(CompressorError::Busy);
            }
            let file = s.task.file.clone().ok_or(ValidationError::NoFileSelected)?;

            s.cancel = CancellationToken::new();
            s.generation += 1;
            s.task.id = Some(Uuid::new_v4());
            s.task.mode = Self::mode_for(self.kind, s.mode);
            s.task.clear_results();
            s.task.phase = if loaded { TaskPhase::Running } else { TaskPhase::Loading };
            s.task.status = STATUS_COMPRESSING.to_string();
            Ok((s.generation, s.cancel.clone(), file, s.task.mode))
        })?;

        info!("Compressing {} '{}' ({} bytes)", self.kind, file.name(), file.size());
        let outcome = self.drive(generation, &file, mode, &cancel).await;
        Ok(self.settle(generation, &cancel, outcome))
    }

    async fn drive(
        &self,
        generation: u64,
        file: &SourceFile,
        mode: Option<VideoMode>,
        cancel: &CancellationToken,
    ) -> Result<(OutputBlob, CompressionStats), RunFailure> {
        self.session.ensure_loaded().await.map_err(RunFailure::Load)?;
        self.shared.update(|s| {
            if s.generation == generation && s.task.phase == TaskPhase::Loading {
                s.task.phase = TaskPhase::Running;
            }
        });
        ensure_live(cancel)?;

        // A canceled task may still be unwinding on the engine.
        let _claim = self.session.claim().await;
        ensure_live(cancel)?;
        self.shared.claim_engine(generation);

        let engine = self.session.engine();
        let input = self.kind.input_name();
        let output = self.kind.output_name();

        let bytes = file.read_bytes().await?;
        ensure_live(cancel)?;
        engine.write_file(input, &bytes).await?;
        drop(bytes);
        ensure_live(cancel)?;

        let args = build_args(self.kind, mode);
        engine.run(&args, cancel.clone()).await?;
        ensure_live(cancel)?;

        let data = engine.read_file(output).await?;
        if self.kind.cleans_up_after_run() {
            for name in [input, output] {
                if let Err(e) = engine.unlink(name).await {
                    warn!("Failed to remove {} from engine filesystem: {}", name, e);
                }
            }
        }

        let stats = CompressionStats::new(file.size(), data.len() as u64);
        Ok((OutputBlob::new(self.kind, data), stats))
    }

    fn settle(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        outcome: Result<(OutputBlob, CompressionStats), RunFailure>,
    ) -> TaskPhase {
        let kind = self.kind;
        self.shared.update(|s| {
            if s.generation != generation || cancel.is_cancelled() {
                match &outcome {
                    Ok(_) => debug!("Discarding result of canceled {} task", kind),
                    Err(e) => debug!("Suppressed error of canceled {} task: {}", kind, e),
                }
                return TaskPhase::Canceled;
            }

            match outcome {
                Ok((blob, stats)) => {
                    info!(
                        "{} compressed: {} → {} bytes ({:.1}% saved)",
                        kind.label(), stats.original_size, stats.compressed_size, stats.compression_ratio
                    );
                    s.task.phase = TaskPhase::Done;
                    s.task.progress = 100;
                    s.task.output = Some(blob);
                    s.task.stats = Some(stats);
                    s.task.status = STATUS_COMPLETED.to_string();
                }
                Err(failure) => {
                    error!("{} compression failed: {}", kind.label(), failure);
                    s.task.status = match failure {
                        RunFailure::Load(_) => STATUS_LOAD_FAILED,
                        RunFailure::Run(_) => STATUS_FAILED,
                    }
                    .to_string();
                    s.task.phase = TaskPhase::Failed;
                    s.task.error = Some(failure.to_string());
                }
            }
            s.task.phase
        })
    }

    /// Cancels the current task and removes the selected file.
    ///
    /// A running engine call is aborted; whatever it still reports is ignored.
    pub fn cancel(&self) {
        let kind = self.kind;
        self.shared.update(|s| {
            if s.task.phase.is_busy() {
                debug!("Canceling running {} task", kind);
            }
            s.cancel.cancel();
            s.generation += 1;
            s.task.clear_results();
            s.task.file = None;
            s.task.phase = TaskPhase::Canceled;
            s.task.status = canceled_status(kind);
        });
    }

    /// Resolves once the current task is neither loading nor running.
    pub async fn wait_until_settled(&self) -> TaskSnapshot {
        let mut updates = self.subscribe();
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if !snapshot.phase.is_busy() || updates.changed().await.is_err() {
                return snapshot;
            }
        }
    }

    /// Cancels any running task and tears the engine down.
    pub async fn shutdown(&self) -> CompressorResult<()> {
        if self.snapshot().phase.is_busy() {
            self.cancel();
        }
        self.session.teardown().await?;
        Ok(())
    }
}
