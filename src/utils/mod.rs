pub mod error;
pub mod formats;
pub mod fs;

pub use error::{CompressorError, CompressorResult, EngineError, EngineResult, ValidationError};
pub use formats::{mime_from_extension, mime_from_path, UNKNOWN_MIME};
pub use fs::{default_output_path, ensure_parent_dir, save_blob};
