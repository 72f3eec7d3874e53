//! draw.io desktop CLI exports.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    DrawportError,
    config::ConvertConfig,
    output::{Fallbacks, resolve_output, sibling_fallbacks},
    process::run_tool,
    tool::ResolvedTool,
};

use super::prepare_output;

/// Arguments for `drawio --export --format svg`.
pub fn svg_args(input: &Path, output: &Path, config: &ConvertConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--export".into(), "--format".into(), "svg".into()];
    if config.embed_fonts {
        args.push("--embed-fonts".into());
    }
    if config.embed_images {
        args.push("--embed-images".into());
    }
    if config.uncompressed {
        args.push("--uncompressed".into());
    }
    args.push("--output".into());
    args.push(output.into());
    args.push(input.into());
    args
}

/// Arguments for `drawio --export --format png`.
pub fn png_args(input: &Path, output: &Path, config: &ConvertConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--export".into(), "--format".into(), "png".into()];
    if let Some(scale) = config.png_scale {
        args.push("--scale".into());
        args.push(scale.to_string().into());
    }
    if let Some(border) = config.png_border {
        args.push("--border".into());
        args.push(border.to_string().into());
    }
    if config.png_transparent {
        args.push("--transparent".into());
    }
    args.push("--output".into());
    args.push(output.into());
    args.push(input.into());
    args
}

/// Export `input` to SVG at `output`.
pub async fn export_svg(
    drawio: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    export(drawio, input, output, "svg", svg_args(input, output, config), config).await
}

/// Export `input` to PNG at `output`.
pub async fn export_png(
    drawio: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    export(drawio, input, output, "png", png_args(input, output, config), config).await
}

async fn export(
    drawio: &ResolvedTool,
    input: &Path,
    output: &Path,
    ext: &str,
    args: Vec<OsString>,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    info!(
        input_path = input.display().to_string(),
        output_path = output.display().to_string(),
        program = drawio.program().display().to_string();
        "Exporting with draw.io"
    );

    prepare_output(output)?;
    let fallbacks = Fallbacks::snapshot(sibling_fallbacks(input, output, ext));
    run_tool(drawio, args, config.timeout()).await?;

    let written = resolve_output(drawio.tool(), output, &fallbacks)?;
    info!(output_path = written.display().to_string(); "draw.io export written");
    Ok(written)
}
