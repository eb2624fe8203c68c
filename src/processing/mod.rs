pub mod args;
mod controller;
mod validation;

pub use args::{IMAGE_QUALITY, VIDEO_CRF, build_args, image_args, video_args};
pub use controller::{
    CompressorController, STATUS_COMPLETED, STATUS_COMPRESSING, STATUS_FAILED, STATUS_LOAD_FAILED,
    canceled_status,
};
pub use validation::{rejection_message, validate_selection};
