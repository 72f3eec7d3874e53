//! External tool identification and executable lookup.
//!
//! Every conversion is carried out by a desktop application. This module
//! knows which applications exist, how each one can be overridden, and how
//! to turn an override, an environment variable, or a bare program name into
//! a concrete executable path.

use std::{
    env,
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, trace};

use crate::DrawportError;

/// An external application Drawport knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// draw.io / diagrams.net desktop.
    Drawio,
    /// Inkscape.
    Inkscape,
    /// LibreOffice (headless).
    LibreOffice,
    /// ImageMagick's `convert`.
    ImageMagick,
}

impl Tool {
    /// All known tools, in lookup order.
    pub const ALL: [Tool; 4] = [
        Tool::Drawio,
        Tool::Inkscape,
        Tool::LibreOffice,
        Tool::ImageMagick,
    ];

    /// Human-readable name used in logs and errors.
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Drawio => "draw.io",
            Tool::Inkscape => "Inkscape",
            Tool::LibreOffice => "LibreOffice",
            Tool::ImageMagick => "ImageMagick",
        }
    }

    /// Program name searched on `PATH` when nothing overrides it.
    pub fn default_program(self) -> &'static str {
        match self {
            Tool::Drawio => "drawio",
            Tool::Inkscape => "inkscape",
            Tool::LibreOffice => "libreoffice",
            Tool::ImageMagick => "convert",
        }
    }

    /// Environment variable consulted when no explicit override is given.
    pub fn env_var(self) -> &'static str {
        match self {
            Tool::Drawio => "DRAWIO_CLI",
            Tool::Inkscape => "INKSCAPE_CLI",
            Tool::LibreOffice => "LIBREOFFICE_CLI",
            Tool::ImageMagick => "IMAGEMAGICK_CLI",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A tool whose executable has been located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    tool: Tool,
    program: PathBuf,
}

impl ResolvedTool {
    /// Wrap an executable path without checking it.
    pub fn new(tool: Tool, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Pick the program candidate for `tool`.
///
/// Search order:
/// 1. `override_program` when non-empty
/// 2. The tool's environment variable when set and non-empty
/// 3. The tool's default program name
pub fn candidate(tool: Tool, override_program: Option<&str>) -> String {
    candidate_with_env(tool, override_program, env::var_os(tool.env_var()))
}

fn candidate_with_env(
    tool: Tool,
    override_program: Option<&str>,
    env_value: Option<OsString>,
) -> String {
    if let Some(program) = override_program.filter(|p| !p.trim().is_empty()) {
        return program.to_string();
    }

    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return value.to_string_lossy().into_owned();
    }

    tool.default_program().to_string()
}

/// Locate the executable for `tool`.
///
/// # Errors
///
/// Returns [`DrawportError::ToolNotFound`] when the candidate is neither an
/// executable path nor a program found on `PATH`.
pub fn resolve(tool: Tool, override_program: Option<&str>) -> Result<ResolvedTool, DrawportError> {
    resolve_with(
        tool,
        override_program,
        env::var_os(tool.env_var()),
        env::var_os("PATH"),
    )
}

/// Same as [`resolve`], with the environment supplied by the caller.
pub fn resolve_with(
    tool: Tool,
    override_program: Option<&str>,
    env_value: Option<OsString>,
    path_var: Option<OsString>,
) -> Result<ResolvedTool, DrawportError> {
    let candidate = candidate_with_env(tool, override_program, env_value);
    debug!(tool = tool.display_name(), candidate = candidate; "Resolving CLI");

    match find_executable(&candidate, path_var.as_deref()) {
        Some(program) => {
            debug!(
                tool = tool.display_name(),
                program = program.display().to_string();
                "CLI resolved"
            );
            Ok(ResolvedTool { tool, program })
        }
        None => Err(DrawportError::ToolNotFound { tool, candidate }),
    }
}

fn find_executable(candidate: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let candidate_path = Path::new(candidate);

    // Anything with a directory component is taken literally.
    if candidate_path.components().count() > 1 || candidate_path.is_absolute() {
        return with_extensions(candidate_path).find(|p| is_executable(p));
    }

    let path_var = path_var?;
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| with_extensions(&dir.join(candidate)).collect::<Vec<_>>())
        .inspect(|p| trace!(path = p.display().to_string(); "Checking PATH entry"))
        .find(|p| is_executable(p))
}

#[cfg(windows)]
fn with_extensions(path: &Path) -> impl Iterator<Item = PathBuf> {
    let exts = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let mut paths = vec![path.to_path_buf()];
    if path.extension().is_none() {
        paths.extend(
            exts.split(';')
                .filter(|ext| !ext.is_empty())
                .map(|ext| path.with_extension(ext.trim_start_matches('.'))),
        );
    }
    paths.into_iter()
}

#[cfg(not(windows))]
fn with_extensions(path: &Path) -> impl Iterator<Item = PathBuf> {
    std::iter::once(path.to_path_buf())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
