//! Codec command lines handed to the engine.

use crate::core::{MediaKind, VideoMode};

/// JPEG quality scale passed as `-q:v` (2 best .. 31 worst).
pub const IMAGE_QUALITY: u8 = 7;

/// Constant rate factor used for every video mode.
pub const VIDEO_CRF: u8 = 28;

/// `-i input.png -q:v 7 output.jpg`
pub fn image_args() -> Vec<String> {
    let kind = MediaKind::Image;
    vec![
        "-i".into(),
        kind.input_name().into(),
        "-q:v".into(),
        IMAGE_QUALITY.to_string(),
        kind.output_name().into(),
    ]
}

/// `-i input.mp4 -vcodec libx264 -crf 28 -preset .. -b:v .. -x264-params .. output.mp4`
pub fn video_args(mode: VideoMode) -> Vec<String> {
    let kind = MediaKind::Video;
    let preset = mode.preset();
    vec![
        "-i".into(),
        kind.input_name().into(),
        "-vcodec".into(),
        "libx264".into(),
        "-crf".into(),
        VIDEO_CRF.to_string(),
        "-preset".into(),
        preset.preset.into(),
        "-b:v".into(),
        preset.bitrate.into(),
        "-x264-params".into(),
        preset.tuning.into(),
        kind.output_name().into(),
    ]
}

/// Argument list for a controller of `kind`. The mode only affects video.
pub fn build_args(kind: MediaKind, mode: Option<VideoMode>) -> Vec<String> {
    match kind {
        MediaKind::Image => image_args(),
        MediaKind::Video => video_args(mode.unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn fast_mode() {
        assert_eq!(
            video_args(VideoMode::Fast),
            owned(&[
                "-i", "input.mp4", "-vcodec", "libx264", "-crf", "28",
                "-preset", "ultrafast", "-b:v", "1000k",
                "-x264-params", "ref=1:subme=1:me=dia:trellis=0:fast_pskip=1",
                "output.mp4",
            ])
        );
    }

    #[test]
    fn balanced_mode() {
        assert_eq!(
            video_args(VideoMode::Balanced),
            owned(&[
                "-i", "input.mp4", "-vcodec", "libx264", "-crf", "28",
                "-preset", "medium", "-b:v", "2000k",
                "-x264-params", "ref=3:subme=6:me=hex:trellis=1",
                "output.mp4",
            ])
        );
    }

    #[test]
    fn high_mode() {
        assert_eq!(
            video_args(VideoMode::High),
            owned(&[
                "-i", "input.mp4", "-vcodec", "libx264", "-crf", "28",
                "-preset", "slow", "-b:v", "3000k",
                "-x264-params", "ref=5:subme=8:me=umh:trellis=2",
                "output.mp4",
            ])
        );
    }

    #[test]
    fn image_ignores_mode() {
        let expected = owned(&["-i", "input.png", "-q:v", "7", "output.jpg"]);
        assert_eq!(build_args(MediaKind::Image, None), expected);
        assert_eq!(build_args(MediaKind::Image, Some(VideoMode::High)), expected);
    }

    #[test]
    fn video_defaults_to_fast_mode() {
        assert_eq!(build_args(MediaKind::Video, None), video_args(VideoMode::Fast));
    }
}
