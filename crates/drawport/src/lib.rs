//! Drawport - convert draw.io diagrams to SVG, EMF and PNG.
//!
//! Drawport does no rendering of its own. Each conversion invokes an
//! external desktop application (the draw.io CLI, Inkscape, LibreOffice or
//! ImageMagick) and picks up the file it writes. This crate holds the
//! pieces shared by the command-line tool and the HTTP facade:
//!
//! - **Tools**: locating executables by override, environment variable or `PATH` ([`tool`])
//! - **Processes**: running a tool with a timeout and captured output ([`process`])
//! - **Converters**: the per-format tool invocations ([`convert::Converter`])
//! - **Placeholders**: page-sized stand-in SVGs ([`placeholder`])
//! - **Pipeline**: batch conversion of a directory ([`pipeline::Pipeline`])
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use drawport::{OutputFormat, config::AppConfig, convert::Converter};
//!
//! # async fn example() -> Result<(), drawport::DrawportError> {
//! let config = AppConfig::default();
//! let converter = Converter::new(config.convert, config.tools);
//! let emf = converter
//!     .convert(Path::new("flow.drawio"), OutputFormat::Emf, Path::new("flow.emf"))
//!     .await?;
//! println!("wrote {}", emf.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod diagram;
pub mod output;
pub mod pipeline;
pub mod placeholder;
pub mod process;
pub mod tool;
pub mod workdir;

mod error;
mod format;

pub use error::DrawportError;
pub use format::OutputFormat;
