//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`Shell`]: the page-level state composing both compressors
//! - [`Task`]: one compression attempt and its lifecycle
//! - [`SourceFile`]: a selected input file
//! - [`VideoMode`] and the static preset table
//! - [`TaskSnapshot`]: serialisable task state for frontends

mod progress;
mod state;
mod task;
mod types;

pub use progress::{TaskSnapshot, ratio_to_percent};
pub use state::{APP_NAME, Footer, FooterLink, Shell, ShellView, TAGLINE, Theme};
pub use task::{SourceFile, Task, TaskPhase};
pub use types::{CompressionStats, MODE_PRESETS, MediaKind, ModePreset, OutputBlob, VideoMode};
