//! Documents read from disk

use crate::{decode_str, expand, DataFormat};
use std::path::Path;
use types::{FetchError, Mapping, Value};

/// Read a document as text, distinguishing a missing file from a read failure
pub fn read_text(path: &Path) -> Result<String, FetchError> {
    if !path.exists() {
        tracing::error!(path = %path.display(), "File doesn't exist");
        return Err(FetchError::NotFound { path: path.to_path_buf() });
    }

    tracing::info!(path = %path.display(), "Reading file");
    std::fs::read_to_string(path)
        .map_err(|source| FetchError::Read { path: path.to_path_buf(), source })
}

/// Read a document, expand it against `scope` and decode it by extension.
///
/// `label` names the document in decode errors.
pub fn load_file(path: &Path, scope: &Mapping, label: &str) -> Result<Value, FetchError> {
    let decode_error = |source| FetchError::Decode { input: label.to_string(), source };

    let format = DataFormat::from_path(path).map_err(decode_error)?;
    let raw = read_text(path)?;

    let expanded = expand(&raw, scope)
        .map_err(|source| FetchError::Expand { path: path.to_path_buf(), source })?;
    tracing::debug!(path = %path.display(), bytes = expanded.len(), "Expanded file");

    decode_str(&expanded, format).map_err(decode_error)
}
