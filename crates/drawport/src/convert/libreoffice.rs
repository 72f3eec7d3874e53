//! LibreOffice headless EMF export.
//!
//! LibreOffice takes an output directory, not a file name, and always
//! writes `<outdir>/<input stem>.emf`. The result is moved to the requested
//! path afterwards.

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

/// Arguments for `libreoffice --headless --convert-to emf --outdir <dir> <svg>`.
pub fn export_args(input: &Path, outdir: &Path) -> Vec<OsString> {
    vec![
        "--headless".into(),
        "--convert-to".into(),
        "emf".into(),
        "--outdir".into(),
        outdir.into(),
        input.into(),
    ]
}

/// Where LibreOffice will write the EMF for `input` inside `outdir`.
pub fn natural_output(input: &Path, outdir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".emf");
    outdir.join(name)
}

/// Convert an SVG to EMF.
pub async fn export_emf(
    libreoffice: &ResolvedTool,
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, DrawportError> {
    let outdir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    info!(
        input_path = input.display().to_string(),
        output_path = output.display().to_string(),
        program = libreoffice.program().display().to_string();
        "Exporting emf with LibreOffice"
    );

    prepare_output(output)?;
    let fallbacks = Fallbacks::snapshot([natural_output(input, &outdir)]);
    run_tool(libreoffice, export_args(input, &outdir), config.timeout()).await?;

    let written = resolve_output(libreoffice.tool(), output, &fallbacks)?;
    info!(output_path = written.display().to_string(); "LibreOffice export written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args() {
        let args = export_args(Path::new("/w/diagram.svg"), Path::new("/w"));
        assert_eq!(
            args,
            [
                "--headless",
                "--convert-to",
                "emf",
                "--outdir",
                "/w",
                "/w/diagram.svg"
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn test_natural_output() {
        assert_eq!(
            natural_output(Path::new("/in/intermediate.svg"), Path::new("/out")),
            PathBuf::from("/out/intermediate.emf")
        );
    }
}
