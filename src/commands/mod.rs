//! Commands driving a controller from start to a saved result.
//!
//! - [`compress_image`]: Compress a single image file
//! - [`compress_video`]: Compress a single video file with a mode

mod compress;

pub use compress::*;
