//! ImageMagick rasterization.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    DrawportError,
    config::ConvertConfig,
    output::{Fallbacks, resolve_output},
    process::run_tool,
    tool::ResolvedTool,
};

use super::prepare_output;

/// Arguments for `convert [-density d] -background none <svg> <png>`.
pub fn export_args(input: &Path, output: &Path, dpi: Option<u32>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if let Some(dpi) = dpi {
        args.push("-density".into());
        args.push(dpi.to_string().into());
    }
    args.push("-background".into());
    args.push("none".into());
    args.push(input.into());
    args.push(output.into());
    args
}

/// Rasterize an SVG to PNG.
pub async fn export_png(
    convert: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    info!(
        input_path = input.display().to_string(),
        output_path = output.display().to_string(),
        program = convert.program().display().to_string();
        "Rasterizing with ImageMagick"
    );

    prepare_output(output)?;
    run_tool(
        convert,
        export_args(input, output, config.raster_dpi),
        config.timeout(),
    )
    .await?;

    let written = resolve_output(convert.tool(), output, &Fallbacks::default())?;
    info!(output_path = written.display().to_string(); "ImageMagick export written");
    Ok(written)
}
