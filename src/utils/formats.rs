use std::path::Path;

/// MIME type reported for files whose extension is not recognised.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Get the declared MIME type for a file extension.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpeg" | "mpg" => "video/mpeg",
        "3gp" => "video/3gpp",
        "ogv" => "video/ogg",
        _ => UNKNOWN_MIME,
    }
}

/// Get the declared MIME type for a path from its extension.
pub fn mime_from_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_from_extension)
        .unwrap_or(UNKNOWN_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_extensions() {
        assert_eq!(mime_from_path("a/b/holiday.JPG"), "image/jpeg");
        assert_eq!(mime_from_path("clip.mov"), "video/quicktime");
        assert_eq!(mime_from_path("notes.txt"), UNKNOWN_MIME);
        assert_eq!(mime_from_path("no_extension"), UNKNOWN_MIME);
    }
}
