//! Configuration types for Drawport.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field has a default, so an empty file is valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`ToolsConfig`] - Explicit executable overrides per [`Tool`].
//! - [`ConvertConfig`] - Timeouts, backends and export flags.
//! - [`PipelineConfig`] - Batch pipeline settings.
//! - [`ServerConfig`] - HTTP facade settings.
//!
//! # Example
//!
//! ```
//! # use drawport::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.convert.timeout().map(|t| t.as_secs()), Some(120));
//! ```

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::tool::Tool;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Explicit executable overrides. These win over the tools' environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub drawio: Option<String>,

    #[serde(default)]
    pub inkscape: Option<String>,

    #[serde(default)]
    pub libreoffice: Option<String>,

    #[serde(default)]
    pub imagemagick: Option<String>,
}

impl ToolsConfig {
    /// Returns the configured override for `tool`, if any.
    pub fn get(&self, tool: Tool) -> Option<&str> {
        match tool {
            Tool::Drawio => self.drawio.as_deref(),
            Tool::Inkscape => self.inkscape.as_deref(),
            Tool::LibreOffice => self.libreoffice.as_deref(),
            Tool::ImageMagick => self.imagemagick.as_deref(),
        }
    }

    /// Replace the override for `tool`.
    pub fn set(&mut self, tool: Tool, program: impl Into<String>) {
        let slot = match tool {
            Tool::Drawio => &mut self.drawio,
            Tool::Inkscape => &mut self.inkscape,
            Tool::LibreOffice => &mut self.libreoffice,
            Tool::ImageMagick => &mut self.imagemagick,
        };
        *slot = Some(program.into());
    }
}

/// How SVG output is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgBackend {
    /// Export through the draw.io CLI.
    #[default]
    Drawio,
    /// Emit a page-sized SVG with a label; no tool is run.
    Placeholder,
}

/// How EMF output is produced from the intermediate SVG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmfBackend {
    #[default]
    Inkscape,
    #[serde(alias = "soffice")]
    LibreOffice,
}

impl EmfBackend {
    pub fn tool(self) -> Tool {
        match self {
            EmfBackend::Inkscape => Tool::Inkscape,
            EmfBackend::LibreOffice => Tool::LibreOffice,
        }
    }
}

/// How PNG output is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngBackend {
    /// Export directly through the draw.io CLI.
    #[default]
    Drawio,
    /// Rasterize the intermediate SVG with Inkscape.
    Inkscape,
    /// Rasterize the intermediate SVG with ImageMagick.
    ImageMagick,
}

impl PngBackend {
    pub fn tool(self) -> Tool {
        match self {
            PngBackend::Drawio => Tool::Drawio,
            PngBackend::Inkscape => Tool::Inkscape,
            PngBackend::ImageMagick => Tool::ImageMagick,
        }
    }
}

/// Conversion settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Seconds each tool run may take. `0` disables the limit.
    pub timeout_secs: u64,

    pub svg_backend: SvgBackend,
    pub emf_backend: EmfBackend,
    pub png_backend: PngBackend,

    /// Pass `--embed-fonts` to draw.io SVG exports.
    pub embed_fonts: bool,
    /// Pass `--embed-images` to draw.io SVG exports.
    pub embed_images: bool,
    /// Pass `--uncompressed` to draw.io SVG exports.
    pub uncompressed: bool,

    /// draw.io PNG `--scale`.
    pub png_scale: Option<f32>,
    /// draw.io PNG `--border`, in pixels.
    pub png_border: Option<u32>,
    /// draw.io PNG `--transparent`.
    pub png_transparent: bool,

    /// Resolution used when rasterizing SVG with Inkscape or ImageMagick.
    pub raster_dpi: Option<u32>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            svg_backend: SvgBackend::default(),
            emf_backend: EmfBackend::default(),
            png_backend: PngBackend::default(),
            embed_fonts: true,
            embed_images: true,
            uncompressed: true,
            png_scale: None,
            png_border: None,
            png_transparent: false,
            raster_dpi: None,
        }
    }
}

impl ConvertConfig {
    /// The per-run timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Batch pipeline settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for `.drawio` files.
    pub diagrams_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            diagrams_dir: PathBuf::from("diagrams"),
        }
    }
}

/// HTTP facade settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// When set, requests must carry `Authorization: Bearer <token>`.
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            max_upload_bytes: 50 * 1024 * 1024,
            auth_token: None,
        }
    }
}
