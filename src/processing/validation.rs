use crate::config::CompressorSettings;
use crate::core::{MediaKind, SourceFile};
use crate::utils::ValidationError;

/// Validates a file selection for a controller of `kind`
pub fn validate_selection(
    kind: MediaKind,
    file: &SourceFile,
    settings: &CompressorSettings,
) -> Result<(), ValidationError> {
    if !kind.accepts(file.mime()) {
        return Err(ValidationError::WrongMediaType {
            expected: kind.mime_category().to_string(),
            found: file.mime().to_string(),
        });
    }

    if let Some(limit) = settings.max_bytes {
        if file.size() > limit {
            return Err(ValidationError::TooLarge { size: file.size(), limit });
        }
    }

    Ok(())
}

/// Status message shown for a rejected selection
pub fn rejection_message(kind: MediaKind, err: &ValidationError) -> String {
    match err {
        ValidationError::WrongMediaType { .. } => {
            format!("Please select a valid {} file", kind.mime_category())
        }
        ValidationError::TooLarge { limit, .. } => {
            format!("{} is too large (max {} MiB)", kind.label(), limit / (1024 * 1024))
        }
        ValidationError::NoFileSelected => format!("Select a {} first", kind.mime_category()),
    }
}
