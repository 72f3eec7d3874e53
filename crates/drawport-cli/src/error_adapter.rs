//! Error adapter for converting CLI errors to miette diagnostics.
//!
//! The library error types stay free of any reporting dependency. This
//! module attaches stable codes and actionable help to them so the CLI can
//! render failures with miette's graphical handler.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use drawport::DrawportError;
use drawport_server::ServerError;

use crate::{CliError, ConfigError};

/// Adapter giving a [`CliError`] a miette diagnostic face.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Drawport(err) => drawport_code(err),
            CliError::Config(ConfigError::Parse { .. }) => "drawport::config::parse",
            CliError::Config(ConfigError::MissingFile(_)) => "drawport::config::missing",
            CliError::Config(ConfigError::Read { .. }) => "drawport::config::read",
            CliError::Server(ServerError::Bind { .. }) => "drawport::server::bind",
            CliError::Server(ServerError::Serve(_)) => "drawport::server",
            CliError::Runtime(_) => "drawport::runtime",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Drawport(err) => drawport_help(err)?,
            CliError::Config(ConfigError::Parse { .. }) => {
                "Check the [tools], [convert], [pipeline] and [server] tables for typos".to_string()
            }
            CliError::Config(ConfigError::MissingFile(_)) => {
                "Pass an existing file to --config, or omit it to use the defaults".to_string()
            }
            CliError::Server(ServerError::Bind { .. }) => {
                "Pick another address with --host/--port or stop the process using it".to_string()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

fn drawport_code(err: &DrawportError) -> &'static str {
    match err {
        DrawportError::Io(_) => "drawport::io",
        DrawportError::ToolNotFound { .. } => "drawport::tool_not_found",
        DrawportError::ToolFailed { .. } => "drawport::tool_failed",
        DrawportError::Timeout { .. } => "drawport::timeout",
        DrawportError::MissingOutput { .. } => "drawport::missing_output",
        DrawportError::EmptyOutput { .. } => "drawport::empty_output",
        DrawportError::InvalidDiagram(_) => "drawport::invalid_diagram",
        DrawportError::Config(_) => "drawport::config",
    }
}

fn drawport_help(err: &DrawportError) -> Option<String> {
    match err {
        DrawportError::ToolNotFound { tool, .. } => Some(format!(
            "Install {} or set {} to the executable path",
            tool.display_name(),
            tool.env_var()
        )),
        DrawportError::ToolFailed { stderr, stdout, .. } => {
            let output = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            (!output.is_empty()).then(|| format!("Tool output:\n{output}"))
        }
        DrawportError::Timeout { .. } => Some(
            "Raise convert.timeout_secs in the configuration file, or set it to 0 to disable the limit"
                .to_string(),
        ),
        DrawportError::MissingOutput { .. } | DrawportError::EmptyOutput { .. } => {
            Some("Rerun with --log-level debug to see where the tool wrote its output".to_string())
        }
        DrawportError::InvalidDiagram(_) => {
            Some("Open the file in draw.io and save it again as .drawio".to_string())
        }
        DrawportError::Io(_) | DrawportError::Config(_) => None,
    }
}
