use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{MediaEngine, ProgressCallback};
use crate::utils::EngineResult;

/// An engine instance owned by one controller, loaded on first use.
///
/// Loading is serialised so concurrent callers never initialise the engine
/// twice. A failed load leaves the session unloaded and the next call retries.
///
/// The engine filesystem uses fixed file names, so only one task may touch it
/// at a time: callers hold [`EngineSession::claim`] from the first write until
/// the last read or unlink.
pub struct EngineSession {
    engine: Arc<dyn MediaEngine>,
    progress: ProgressCallback,
    loaded: AtomicBool,
    load_lock: Mutex<()>,
    run_lock: Mutex<()>,
}

impl EngineSession {
    pub fn new(engine: Arc<dyn MediaEngine>, progress: ProgressCallback) -> Self {
        Self {
            engine,
            progress,
            loaded: AtomicBool::new(false),
            load_lock: Mutex::new(()),
            run_lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &dyn MediaEngine {
        self.engine.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Loads the engine unless already loaded. Returns true if this call loaded it.
    pub async fn ensure_loaded(&self) -> EngineResult<bool> {
        if self.is_loaded() {
            return Ok(false);
        }

        let _guard = self.load_lock.lock().await;
        if self.is_loaded() {
            return Ok(false);
        }

        debug!("Loading {} engine", self.engine.name());
        self.engine.set_progress(self.progress.clone());
        self.engine.load().await?;
        self.loaded.store(true, Ordering::Release);
        debug!("✓ {} engine loaded", self.engine.name());
        Ok(true)
    }

    /// Waits until no other task is using the engine filesystem.
    pub async fn claim(&self) -> MutexGuard<'_, ()> {
        self.run_lock.lock().await
    }

    /// Tears the engine down. The next `ensure_loaded` loads it again.
    pub async fn teardown(&self) -> EngineResult<()> {
        let _guard = self.load_lock.lock().await;
        if !self.loaded.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("Shutting down {} engine", self.engine.name());
        self.engine.exit().await
    }
}
