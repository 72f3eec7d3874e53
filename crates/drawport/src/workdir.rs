//! Per-request scratch directories.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::TempDir;

use crate::DrawportError;

/// Name used when an upload's file name has nothing usable left after sanitizing.
pub const FALLBACK_UPLOAD_NAME: &str = "diagram.drawio";

/// A temporary directory that is deleted when dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create a fresh directory under the system temp dir.
    pub fn new() -> Result<Self, DrawportError> {
        let dir = tempfile::Builder::new().prefix("drawport-").tempdir()?;
        debug!(path = dir.path().display().to_string(); "Created work directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an uploaded file into the directory under a sanitized name.
    pub fn store_upload(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DrawportError> {
        let path = self.dir.path().join(sanitize_file_name(file_name));
        fs::write(&path, bytes)?;
        debug!(path = path.display().to_string(), size = bytes.len(); "Stored upload");
        Ok(path)
    }

    /// Path for an output file named after `input` with extension `ext`.
    pub fn output_for(&self, input: &Path, ext: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "diagram".to_string());
        self.dir.path().join("out").join(format!("{stem}.{ext}"))
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Only the last component is kept (either separator style) and any
/// character outside `[A-Za-z0-9._-]` is dropped. Names left with no stem,
/// such as `ü.drawio`, become [`FALLBACK_UPLOAD_NAME`].
pub fn sanitize_file_name(file_name: &str) -> String {
    let last = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = cleaned.trim_start_matches('.');

    // Trimming leading dots must not turn the extension into the whole name.
    let stem_lost = cleaned.contains('.') && !trimmed.contains('.');
    if trimmed.is_empty() || stem_lost {
        FALLBACK_UPLOAD_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
