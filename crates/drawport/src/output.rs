//! Locating the file a tool actually wrote.
//!
//! Not every tool honours its output flag. LibreOffice always names the
//! result after the input, and some draw.io builds write next to the input
//! file. Before a tool runs, [`Fallbacks::snapshot`] records the state of
//! those alternative locations. After it exits, [`resolve_output`] checks
//! the requested path first and then any fallback the tool created or
//! rewrote, moving the first match into place. Files that were already
//! there and untouched belong to someone else and are left alone.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use log::{debug, info};

use crate::{DrawportError, tool::Tool};

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl Stamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok().filter(|m| m.is_file())?;
        Some(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Alternative output locations, with what each held before the tool ran.
#[derive(Debug, Clone, Default)]
pub struct Fallbacks {
    entries: Vec<(PathBuf, Option<Stamp>)>,
}

impl Fallbacks {
    /// Record the current state of `paths`. Call this right before running the tool.
    pub fn snapshot(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let entries = paths
            .into_iter()
            .map(|path| {
                let stamp = Stamp::of(&path);
                (path, stamp)
            })
            .collect();
        Self { entries }
    }

    /// Fallbacks whose content changed since the snapshot, with their current stamp.
    fn touched(&self, expected: &Path) -> impl Iterator<Item = (&Path, Stamp)> {
        self.entries
            .iter()
            .filter(move |(path, _)| path.as_path() != expected)
            .filter_map(|(path, before)| match (Stamp::of(path), before) {
                (None, _) => {
                    debug!(path = path.display().to_string(); "Fallback output not present");
                    None
                }
                (Some(now), Some(before)) if now == *before => {
                    debug!(path = path.display().to_string(); "Ignoring file left over from an earlier run");
                    None
                }
                (Some(now), _) => Some((path.as_path(), now)),
            })
    }
}

/// Make sure `expected` holds a non-empty file produced by `tool`.
///
/// # Errors
///
/// Returns [`DrawportError::EmptyOutput`] if the only output the tool
/// produced is empty, and [`DrawportError::MissingOutput`] if it produced
/// nothing.
pub fn resolve_output(
    tool: Tool,
    expected: &Path,
    fallbacks: &Fallbacks,
) -> Result<PathBuf, DrawportError> {
    let mut saw_empty = false;

    match Stamp::of(expected) {
        Some(stamp) if stamp.len > 0 => return Ok(expected.to_path_buf()),
        Some(_) => saw_empty = true,
        None => {}
    }

    for (fallback, stamp) in fallbacks.touched(expected) {
        if stamp.len == 0 {
            saw_empty = true;
            continue;
        }
        info!(
            tool = tool.display_name(),
            from = fallback.display().to_string(),
            to = expected.display().to_string();
            "Output written to unexpected location, moving into place"
        );
        move_file(fallback, expected)?;
        return Ok(expected.to_path_buf());
    }

    let path = expected.to_path_buf();
    if saw_empty {
        Err(DrawportError::EmptyOutput { tool, path })
    } else {
        Err(DrawportError::MissingOutput { tool, path })
    }
}

/// Paths a tool converting `input` into an `ext` file commonly writes to
/// instead of `expected`.
pub fn sibling_fallbacks(input: &Path, expected: &Path, ext: &str) -> Vec<PathBuf> {
    let mut fallbacks = vec![input.with_extension(ext)];

    if let (Some(dir), Some(stem)) = (expected.parent(), input.file_stem()) {
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(ext);
        let candidate = dir.join(name);
        if !fallbacks.contains(&candidate) {
            fallbacks.push(candidate);
        }
    }

    fallbacks
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Rename fails across filesystems; fall back to copying.
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
