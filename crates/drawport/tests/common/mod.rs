//! Fake tool scripts standing in for the desktop applications.

#![allow(dead_code)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use drawport::{
    config::{ConvertConfig, ToolsConfig},
    convert::Converter,
    tool::Tool,
};

/// draw.io stand-in: writes a tiny SVG to `--output`, fails for inputs named `*broken*`.
pub const FAKE_DRAWIO: &str = r#"
out=""
while [ $# -gt 1 ]; do
  case "$1" in
    --output) shift; out="$1" ;;
  esac
  shift
done
case "$1" in
  *broken*) echo "Error: cannot parse $1" >&2; exit 1 ;;
esac
printf '<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>' > "$out"
"#;

/// draw.io stand-in that ignores `--output` and writes next to the input.
pub const FAKE_DRAWIO_IGNORING_OUTPUT: &str = r#"
for last in "$@"; do :; done
printf '<svg xmlns="http://www.w3.org/2000/svg"/>' > "${last%.*}.svg"
"#;

/// Inkscape stand-in: writes to `--export-filename=`.
pub const FAKE_INKSCAPE: &str = r#"
for a in "$@"; do
  case "$a" in
    --export-filename=*) out="${a#--export-filename=}" ;;
  esac
done
printf 'EMF+' > "$out"
"#;

/// LibreOffice stand-in: always writes `<outdir>/<stem>.emf`.
pub const FAKE_LIBREOFFICE: &str = r#"
while [ $# -gt 1 ]; do
  case "$1" in
    --outdir) shift; dir="$1" ;;
  esac
  shift
done
base=$(basename "$1")
printf 'EMF+' > "$dir/${base%.*}.emf"
"#;

/// ImageMagick stand-in: the last argument is the output.
pub const FAKE_CONVERT: &str = r#"
for last in "$@"; do :; done
printf '\211PNG\r\n\032\n' > "$last"
"#;

/// Tool stand-in that exits successfully without writing anything.
pub const FAKE_SILENT: &str = "exit 0";

/// Write an executable shell script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// Tool overrides pointing at a full set of well-behaved fakes in `dir`.
pub fn fake_tools(dir: &Path) -> ToolsConfig {
    let mut tools = ToolsConfig::default();
    tools.set(Tool::Drawio, path_str(write_script(dir, "drawio", FAKE_DRAWIO)));
    tools.set(Tool::Inkscape, path_str(write_script(dir, "inkscape", FAKE_INKSCAPE)));
    tools.set(
        Tool::LibreOffice,
        path_str(write_script(dir, "libreoffice", FAKE_LIBREOFFICE)),
    );
    tools.set(Tool::ImageMagick, path_str(write_script(dir, "convert", FAKE_CONVERT)));
    tools
}

pub fn converter(config: ConvertConfig, tools: ToolsConfig) -> Converter {
    Converter::new(config, tools)
}

/// Path to a file under the workspace `fixtures/` directory.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .join("fixtures")
        .join(name)
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
