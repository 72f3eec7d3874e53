//! Inkscape exports from SVG.

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

/// Arguments for `inkscape <svg> --export-type=<ext> --export-filename=<out>`.
pub fn export_args(input: &Path, output: &Path, ext: &str, dpi: Option<u32>) -> Vec<OsString> {
    let mut filename = OsString::from("--export-filename=");
    filename.push(output);

    let mut args = vec![
        input.as_os_str().to_os_string(),
        format!("--export-type={ext}").into(),
        filename,
    ];
    if let Some(dpi) = dpi {
        args.push(format!("--export-dpi={dpi}").into());
    }
    args
}

/// Convert an SVG to EMF.
pub async fn export_emf(
    inkscape: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    export(inkscape, input, output, "emf", None, config).await
}

/// Rasterize an SVG to PNG.
pub async fn export_png(
    inkscape: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    export(inkscape, input, output, "png", config.raster_dpi, config).await
}

async fn export(
    inkscape: &ResolvedTool,
    input: &Path,
    output: &Path,
    ext: &str,
    dpi: Option<u32>,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    info!(
        input_path = input.display().to_string(),
        output_path = output.display().to_string(),
        program = inkscape.program().display().to_string();
        "Exporting {ext} with Inkscape"
    );

    prepare_output(output)?;
    let fallbacks = Fallbacks::snapshot(sibling_fallbacks(input, output, ext));
    run_tool(inkscape, export_args(input, output, ext, dpi), config.timeout()).await?;

    let written = resolve_output(inkscape.tool(), output, &fallbacks)?;
    info!(output_path = written.display().to_string(); "Inkscape export written");
    Ok(written)
}
