#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use slimify_lib::engine::{EngineFuture, MediaEngine, ProgressCallback};
use slimify_lib::{EngineError, SourceFile};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// In-memory engine that "compresses" by keeping every other byte of the input.
pub struct FakeEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    progress: Mutex<Option<ProgressCallback>>,
    run_args: Mutex<Vec<Vec<String>>>,
    unlinked: Mutex<Vec<String>>,
    load_attempts: AtomicUsize,
    exits: AtomicUsize,
    failing_loads: AtomicUsize,
    fail_runs: bool,
    gate: Option<Arc<Notify>>,
    write_gate: Option<Arc<Notify>>,
    writes: AtomicUsize,
    honor_cancel: bool,
    pub started: Notify,
    pub write_started: Notify,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            progress: Mutex::new(None),
            run_args: Mutex::new(Vec::new()),
            unlinked: Mutex::new(Vec::new()),
            load_attempts: AtomicUsize::new(0),
            exits: AtomicUsize::new(0),
            failing_loads: AtomicUsize::new(0),
            fail_runs: false,
            gate: None,
            write_gate: None,
            writes: AtomicUsize::new(0),
            honor_cancel: true,
            started: Notify::new(),
            write_started: Notify::new(),
        }
    }

    /// Runs block until [`FakeEngine::release`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// The first `write_file` blocks until [`FakeEngine::release_write`] is called.
    pub fn gated_first_write(mut self) -> Self {
        self.write_gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release_write(&self) {
        if let Some(gate) = &self.write_gate {
            gate.notify_one();
        }
    }

    /// Runs keep going after their cancellation token fires.
    pub fn ignoring_cancel(mut self) -> Self {
        self.honor_cancel = false;
        self
    }

    pub fn failing_runs(mut self) -> Self {
        self.fail_runs = true;
        self
    }

    pub fn failing_loads(self, count: usize) -> Self {
        self.failing_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Reports progress the way the engine would while running.
    pub fn report(&self, ratio: f64) {
        let callback = self.progress.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(ratio);
        }
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> Vec<Vec<String>> {
        self.run_args.lock().unwrap().clone()
    }

    pub fn unlinked(&self) -> Vec<String> {
        self.unlinked.lock().unwrap().clone()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

impl MediaEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn load(&self) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            self.load_attempts.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failing_loads.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_loads.store(remaining - 1, Ordering::SeqCst);
                return Err(EngineError::Load("engine binary unavailable".into()));
            }
            Ok(())
        })
    }

    fn set_progress(&self, callback: ProgressCallback) {
        *self.progress.lock().unwrap() = Some(callback);
    }

    fn write_file<'a>(&'a self, name: &'a str, data: &'a [u8]) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            let first = self.writes.fetch_add(1, Ordering::SeqCst) == 0;
            if let (true, Some(gate)) = (first, &self.write_gate) {
                self.write_started.notify_one();
                gate.notified().await;
            }
            self.files.lock().unwrap().insert(name.to_string(), data.to_vec());
            Ok(())
        })
    }

    fn read_file<'a>(&'a self, name: &'a str) -> EngineFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.files
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::fs(name, "no such file"))
        })
    }

    fn unlink<'a>(&'a self, name: &'a str) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            self.unlinked.lock().unwrap().push(name.to_string());
            self.files
                .lock()
                .unwrap()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| EngineError::fs(name, "no such file"))
        })
    }

    fn run<'a>(&'a self, args: &'a [String], cancel: CancellationToken) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            self.run_args.lock().unwrap().push(args.to_vec());
            self.started.notify_one();

            if let Some(gate) = &self.gate {
                if self.honor_cancel {
                    tokio::select! {
                        _ = gate.notified() => {}
                        _ = cancel.cancelled() => return Err(EngineError::Aborted),
                    }
                } else {
                    gate.notified().await;
                }
            }

            if self.fail_runs {
                return Err(EngineError::run("encoder crashed"));
            }

            let input_name = &args[1];
            let output_name = args.last().expect("output name");
            let input = self
                .files
                .lock()
                .unwrap()
                .get(input_name)
                .cloned()
                .ok_or_else(|| EngineError::fs(input_name.as_str(), "no such file"))?;
            let output: Vec<u8> = input.iter().step_by(2).copied().collect();
            self.files.lock().unwrap().insert(output_name.clone(), output);
            self.report(1.0);
            Ok(())
        })
    }

    fn exit(&self) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            self.exits.fetch_add(1, Ordering::SeqCst);
            self.files.lock().unwrap().clear();
            Ok(())
        })
    }
}

pub fn png(len: usize) -> SourceFile {
    SourceFile::from_bytes("photo.png", "image/png", vec![7; len])
}

pub fn mp4(len: usize) -> SourceFile {
    SourceFile::from_bytes("clip.mp4", "video/mp4", vec![9; len])
}
