//! Source loading.

use std::fs;
use std::path::Path;

use crate::error::{InspectError, Result};

/// Read the whole file at `path` as UTF-8 text.
///
/// Fails with `NotFound` unless `path` names an existing regular file.
/// Empty files load as empty text. Invalid UTF-8 sequences are replaced
/// rather than rejected.
pub fn load(path: &Path) -> Result<String> {
    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        tracing::debug!(path = %path.display(), "source file not found");
        return Err(InspectError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// The type name a file is expected to declare: its base name without
/// the last extension (`src/Foo.java` -> `Foo`).
pub fn expected_type_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
