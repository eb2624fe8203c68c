use std::path::{Path, PathBuf};

use tokio::fs;

use crate::core::OutputBlob;
use crate::utils::CompressorResult;

/// Create the parent directory of `path` if it is missing
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> CompressorResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Write a compressed result to disk
pub async fn save_blob(blob: &OutputBlob, path: impl AsRef<Path>) -> CompressorResult<()> {
    let path = path.as_ref();
    ensure_parent_dir(path).await?;
    fs::write(path, blob.bytes()).await?;
    Ok(())
}

/// Default destination for a result: the blob's suggested name next to the input,
/// or in the current directory for in-memory sources.
pub fn default_output_path(input: Option<&Path>, blob: &OutputBlob) -> PathBuf {
    input
        .and_then(|p| p.parent())
        .unwrap_or_else(|| Path::new(""))
        .join(blob.file_name())
}
