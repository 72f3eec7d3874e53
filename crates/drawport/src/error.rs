//! Error types for Drawport operations.
//!
//! This module provides the main error type [`DrawportError`] which covers
//! everything that can go wrong while locating a tool, running it, and
//! picking up the file it produced.

use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

use crate::tool::Tool;

/// The main error type for Drawport operations.
#[derive(Debug, Error)]
pub enum DrawportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{} CLI '{candidate}' not found", tool.display_name())]
    ToolNotFound { tool: Tool, candidate: String },

    #[error("{} exited with {status}", tool.display_name())]
    ToolFailed {
        tool: Tool,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("{} did not finish within {}s", tool.display_name(), timeout.as_secs())]
    Timeout { tool: Tool, timeout: Duration },

    #[error("{} produced no output at {}", tool.display_name(), path.display())]
    MissingOutput { tool: Tool, path: PathBuf },

    #[error("{} produced an empty file at {}", tool.display_name(), path.display())]
    EmptyOutput { tool: Tool, path: PathBuf },

    #[error("Invalid diagram: {0}")]
    InvalidDiagram(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DrawportError {
    /// The tool involved in this error, if any.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            Self::ToolNotFound { tool, .. }
            | Self::ToolFailed { tool, .. }
            | Self::Timeout { tool, .. }
            | Self::MissingOutput { tool, .. }
            | Self::EmptyOutput { tool, .. } => Some(*tool),
            Self::Io(_) | Self::InvalidDiagram(_) | Self::Config(_) => None,
        }
    }

    /// Whether the error was caused by the input diagram rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidDiagram(_))
    }
}
