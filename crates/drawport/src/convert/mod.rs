//! Converters for each supported format pair.
//!
//! Every converter is a single external tool call. [`Converter`] chooses the
//! tools for a target [`OutputFormat`] from the [`ConvertConfig`] backends and
//! sequences them, going through an intermediate SVG where needed.

pub mod drawio;
pub mod imagemagick;
pub mod inkscape;
pub mod libreoffice;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, error, info};

use crate::{
    DrawportError,
    config::{ConvertConfig, EmfBackend, PngBackend, SvgBackend, ToolsConfig},
    format::OutputFormat,
    placeholder::write_placeholder,
    tool::{self, ResolvedTool, Tool},
};

/// Ensure `output` can be written and does not hold a stale result.
pub(crate) fn prepare_output(output: &Path) -> io::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match fs::remove_file(output) {
        Ok(()) => {
            debug!(path = output.display().to_string(); "Removed stale output");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Drives the external tools for a conversion.
///
/// Tools are located when a backend is used, not up front, so a missing
/// optional tool only fails the conversions that need it.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
    tools: ToolsConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig, tools: ToolsConfig) -> Self {
        Self { config, tools }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Locate `tool`, honouring the configured override.
    pub fn resolve(&self, tool: Tool) -> Result<ResolvedTool, DrawportError> {
        tool::resolve(tool, self.tools.get(tool))
    }

    /// Tools needed to produce `format` with the configured backends.
    pub fn required_tools(&self, format: OutputFormat) -> Vec<Tool> {
        let svg_tools = match self.config.svg_backend {
            SvgBackend::Drawio => vec![Tool::Drawio],
            SvgBackend::Placeholder => Vec::new(),
        };

        match format {
            OutputFormat::Svg => svg_tools,
            OutputFormat::Emf => {
                let mut tools = svg_tools;
                tools.push(self.config.emf_backend.tool());
                tools
            }
            OutputFormat::Png => match self.config.png_backend {
                PngBackend::Drawio => vec![Tool::Drawio],
                backend => {
                    let mut tools = svg_tools;
                    tools.push(backend.tool());
                    tools
                }
            },
        }
    }

    /// Convert `input` to `format`, writing to `output`.
    ///
    /// Intermediate SVGs are written next to `output`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first tool that fails. Later steps are not run.
    pub async fn convert(
        &self,
        input: &Path,
        format: OutputFormat,
        output: &Path,
    ) -> Result<PathBuf, DrawportError> {
        info!(
            input_path = input.display().to_string(),
            output_path = output.display().to_string(),
            format:% = format;
            "Converting diagram"
        );

        match format {
            OutputFormat::Svg => self.drawio_to_svg(input, output).await,
            OutputFormat::Emf => {
                let svg = intermediate_svg(output);
                self.drawio_to_emf(input, &svg, output).await
            }
            OutputFormat::Png => match self.config.png_backend {
                PngBackend::Drawio => {
                    let drawio = self.resolve(Tool::Drawio)?;
                    drawio::export_png(&drawio, input, output, &self.config).await
                }
                PngBackend::Inkscape | PngBackend::ImageMagick => {
                    let svg = intermediate_svg(output);
                    self.drawio_to_svg(input, &svg).await?;
                    self.svg_to_png(&svg, output).await
                }
            },
        }
    }

    /// Produce an SVG with the configured SVG backend.
    pub async fn drawio_to_svg(&self, input: &Path, output: &Path) -> Result<PathBuf, DrawportError> {
        match self.config.svg_backend {
            SvgBackend::Drawio => {
                let drawio = self.resolve(Tool::Drawio)?;
                drawio::export_svg(&drawio, input, output, &self.config).await
            }
            SvgBackend::Placeholder => {
                write_placeholder(input, output)?;
                Ok(output.to_path_buf())
            }
        }
    }

    /// Convert an SVG to EMF with the configured EMF backend.
    pub async fn svg_to_emf(&self, svg: &Path, output: &Path) -> Result<PathBuf, DrawportError> {
        let tool = self.resolve(self.config.emf_backend.tool())?;
        match self.config.emf_backend {
            EmfBackend::Inkscape => inkscape::export_emf(&tool, svg, output, &self.config).await,
            EmfBackend::LibreOffice => {
                libreoffice::export_emf(&tool, svg, output, &self.config).await
            }
        }
    }

    /// Rasterize an SVG with the configured PNG backend.
    ///
    /// With the draw.io PNG backend there is no SVG rasterizer, so Inkscape is used.
    pub async fn svg_to_png(&self, svg: &Path, output: &Path) -> Result<PathBuf, DrawportError> {
        match self.config.png_backend {
            PngBackend::ImageMagick => {
                let convert = self.resolve(Tool::ImageMagick)?;
                imagemagick::export_png(&convert, svg, output, &self.config).await
            }
            PngBackend::Inkscape | PngBackend::Drawio => {
                let inkscape = self.resolve(Tool::Inkscape)?;
                inkscape::export_png(&inkscape, svg, output, &self.config).await
            }
        }
    }

    /// Produce `svg` and then `emf` from `input`.
    ///
    /// The EMF step is skipped when the SVG step fails.
    pub async fn drawio_to_emf(
        &self,
        input: &Path,
        svg: &Path,
        emf: &Path,
    ) -> Result<PathBuf, DrawportError> {
        if let Err(err) = self.drawio_to_svg(input, svg).await {
            error!(
                input_path = input.display().to_string(), err:err;
                "Skipping EMF conversion because SVG export failed"
            );
            return Err(err);
        }

        match self.svg_to_emf(svg, emf).await {
            Ok(path) => Ok(path),
            Err(err) => {
                error!(
                    input_path = input.display().to_string(), err:err;
                    "SVG exported but EMF conversion failed"
                );
                Err(err)
            }
        }
    }
}

fn intermediate_svg(output: &Path) -> PathBuf {
    let svg = output.with_extension("svg");
    if svg == output {
        output.with_extension("intermediate.svg")
    } else {
        svg
    }
}
