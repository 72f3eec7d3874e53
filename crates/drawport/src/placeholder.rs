//! Placeholder SVG output.
//!
//! Produces an SVG the size of the diagram's first page with a centered
//! label. Nothing from the diagram itself is drawn; this backend exists so
//! the HTTP facade can answer without the draw.io desktop app installed.

use std::{fs, path::Path};

use log::info;
use svg::{
    Document,
    node::{Text as SvgText, element as svg_element},
};

use crate::{DrawportError, diagram::DiagramInfo};

/// Render a placeholder SVG sized to the first page of `info`.
pub fn placeholder_svg(info: &DiagramInfo, label: &str) -> String {
    let page = info.first_page();
    let (width, height) = (page.width, page.height);

    let background = svg_element::Rectangle::new()
        .set("x", 0)
        .set("y", 0)
        .set("width", width)
        .set("height", height)
        .set("fill", "white")
        .set("stroke", "#999999")
        .set("stroke-width", 1);

    let text = svg_element::Text::new("")
        .set("x", width / 2.0)
        .set("y", height / 2.0)
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central")
        .set("font-family", "Arial, Helvetica, sans-serif")
        .set("font-size", 16)
        .set("fill", "#333333")
        .add(SvgText::new(label));

    Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height))
        .add(background)
        .add(text)
        .to_string()
}

/// Read `input`, and write a placeholder SVG labelled with its file stem to `output`.
///
/// # Errors
///
/// Returns [`DrawportError::Io`] if the input cannot be read or the output
/// cannot be written, and [`DrawportError::InvalidDiagram`] if the input is
/// not UTF-8 text or not a draw.io document.
pub fn write_placeholder(input: &Path, output: &Path) -> Result<(), DrawportError> {
    let xml = String::from_utf8(fs::read(input)?).map_err(|err| {
        DrawportError::InvalidDiagram(format!("file is not UTF-8 text: {}", err.utf8_error()))
    })?;
    let info = DiagramInfo::parse(&xml)?;
    let label = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| info.first_page().name.clone());

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, placeholder_svg(&info, &label))?;

    info!(
        input_path = input.display().to_string(),
        output_path = output.display().to_string();
        "Placeholder SVG written"
    );
    Ok(())
}
