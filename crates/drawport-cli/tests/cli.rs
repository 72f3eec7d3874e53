use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use assert_cmd::prelude::*;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    repo_root().join("fixtures").join(name)
}

/// A `drawport` command isolated from the caller's tool environment.
fn drawport(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("drawport"));
    cmd.current_dir(cwd)
        .env_remove("DRAWIO_CLI")
        .env_remove("INKSCAPE_CLI")
        .env_remove("LIBREOFFICE_CLI")
        .env_remove("IMAGEMAGICK_CLI");
    cmd
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("drawport.toml");
    fs::write(&path, body).expect("write config");
    path
}

#[test]
fn cli_help_lists_subcommands() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = drawport(tmp.path()).arg("--help").output().expect("run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["convert", "batch", "serve", "check"] {
        assert!(stdout.contains(sub), "missing {sub} in:\n{stdout}");
    }
}

#[test]
fn cli_writes_placeholder_svg_next_to_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("architecture.drawio");
    fs::copy(fixture("architecture.drawio"), &input).expect("copy fixture");

    drawport(tmp.path())
        .args(["convert", "--placeholder"])
        .arg(&input)
        .assert()
        .success();

    let svg = fs::read_to_string(tmp.path().join("architecture.svg")).expect("read svg");
    assert!(svg.contains(r#"viewBox="0 0 1169 827""#), "unexpected svg:\n{svg}");
    assert!(svg.contains("architecture"));
}

#[test]
fn cli_placeholder_rejects_invalid_diagrams() {
    let tmp = tempfile::tempdir().expect("tempdir");

    for name in ["not-a-diagram", "no-pages", "truncated"] {
        let output = tmp.path().join(format!("{name}.svg"));

        drawport(tmp.path())
            .args(["convert", "--placeholder", "-o"])
            .arg(&output)
            .arg(fixture(&format!("errors/{name}.drawio")))
            .assert()
            .code(1);

        assert!(!output.exists(), "{name} produced output");
    }
}

#[test]
fn cli_missing_tool_exits_with_one() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_config(
        tmp.path(),
        "[tools]\ninkscape = \"/nonexistent/bin/inkscape\"\n",
    );

    drawport(tmp.path())
        .arg("--config")
        .arg(&config)
        .args(["convert", "--placeholder", "--format", "emf", "-o"])
        .arg(tmp.path().join("out/bare-model.emf"))
        .arg(fixture("bare-model.drawio"))
        .assert()
        .code(1);

    assert!(!tmp.path().join("out/bare-model.emf").exists());
}

#[test]
fn cli_missing_config_file_exits_with_one() {
    let tmp = tempfile::tempdir().expect("tempdir");

    drawport(tmp.path())
        .args(["--config", "absent.toml", "check"])
        .assert()
        .code(1);
}

#[cfg(unix)]
mod with_fake_tools {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    const FAKE_DRAWIO: &str = r#"
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
printf '<svg xmlns="http://www.w3.org/2000/svg"/>' > "$out"
"#;

    const FAKE_INKSCAPE: &str = r#"
for a in "$@"; do
  case "$a" in
    --export-filename=*) out="${a#--export-filename=}" ;;
  esac
done
printf 'EMF+' > "$out"
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }

    /// Config pointing at fake tools and a `diagrams/` directory under `dir`.
    fn setup(dir: &Path) -> (PathBuf, PathBuf) {
        let bin = dir.join("bin");
        fs::create_dir(&bin).expect("bin dir");
        let drawio = write_script(&bin, "drawio", FAKE_DRAWIO);
        let inkscape = write_script(&bin, "inkscape", FAKE_INKSCAPE);

        let diagrams = dir.join("diagrams");
        fs::create_dir(&diagrams).expect("diagrams dir");

        let config = write_config(
            dir,
            &format!(
                "[tools]\ndrawio = {:?}\ninkscape = {:?}\n\n[pipeline]\ndiagrams_dir = {:?}\n",
                drawio.display().to_string(),
                inkscape.display().to_string(),
                diagrams.display().to_string(),
            ),
        );
        (config, diagrams)
    }

    #[test]
    fn cli_batch_converts_every_diagram() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (config, diagrams) = setup(tmp.path());
        fs::copy(fixture("architecture.drawio"), diagrams.join("architecture.drawio")).unwrap();
        fs::copy(fixture("compressed.drawio"), diagrams.join("gateway.drawio")).unwrap();

        drawport(tmp.path())
            .arg("--config")
            .arg(&config)
            .arg("batch")
            .assert()
            .success();

        for stem in ["architecture", "gateway"] {
            assert!(diagrams.join(format!("{stem}.svg")).exists(), "{stem}.svg");
            let emf = fs::read(diagrams.join(format!("{stem}.emf"))).expect("read emf");
            assert_eq!(emf, b"EMF+");
        }
    }

    #[test]
    fn cli_batch_reports_partial_failure() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (config, diagrams) = setup(tmp.path());
        fs::copy(fixture("bare-model.drawio"), diagrams.join("good.drawio")).unwrap();
        fs::copy(fixture("bare-model.drawio"), diagrams.join("broken.drawio")).unwrap();

        drawport(tmp.path())
            .arg("--config")
            .arg(&config)
            .arg("batch")
            .assert()
            .code(2);

        assert!(diagrams.join("good.emf").exists());
        assert!(!diagrams.join("broken.svg").exists());
        assert!(!diagrams.join("broken.emf").exists());
    }

    #[test]
    fn cli_batch_dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (config, diagrams) = setup(tmp.path());
        fs::copy(fixture("bare-model.drawio"), diagrams.join("plan.drawio")).unwrap();

        drawport(tmp.path())
            .arg("--config")
            .arg(&config)
            .args(["batch", "--dry-run"])
            .assert()
            .success();

        let entries: Vec<_> = fs::read_dir(&diagrams).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn cli_batch_flag_overrides_config_tool() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (config, diagrams) = setup(tmp.path());
        fs::copy(fixture("bare-model.drawio"), diagrams.join("plan.drawio")).unwrap();

        drawport(tmp.path())
            .arg("--config")
            .arg(&config)
            .args(["batch", "--drawio-cli", "/nonexistent/bin/drawio"])
            .assert()
            .code(1);

        assert!(!diagrams.join("plan.svg").exists());
    }

    #[test]
    fn cli_check_reports_resolved_tools() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (config, _) = setup(tmp.path());

        let output = drawport(tmp.path())
            .arg("--config")
            .arg(&config)
            .arg("check")
            .output()
            .expect("run");

        assert!(output.status.success(), "{output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("bin/drawio"), "stdout was:\n{stdout}");
        assert!(stdout.contains("bin/inkscape"), "stdout was:\n{stdout}");
    }
}
