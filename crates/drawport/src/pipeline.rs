//! Batch conversion of a directory of diagrams.
//!
//! Every `.drawio` file directly inside the diagrams directory is exported
//! to an SVG and then an EMF, both written next to the source file. Files
//! are processed one at a time; a failure is recorded and the run moves on.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use crate::{DrawportError, config::SvgBackend, convert::Converter, tool::Tool};

/// Process exit code when every diagram converted (or there was nothing to do).
pub const EXIT_OK: i32 = 0;
/// Process exit code when the run could not start.
pub const EXIT_SETUP_FAILED: i32 = 1;
/// Process exit code when at least one diagram failed.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Planned outputs for one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedConversion {
    pub input: PathBuf,
    pub svg: PathBuf,
    pub emf: PathBuf,
}

impl PlannedConversion {
    pub fn new(input: PathBuf) -> Self {
        Self {
            svg: input.with_extension("svg"),
            emf: input.with_extension("emf"),
            input,
        }
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub total: usize,
    pub converted: usize,
    pub failures: Vec<(PathBuf, DrawportError)>,
    pub dry_run: bool,
}

impl PipelineReport {
    /// Exit code following the batch script convention.
    pub fn exit_code(&self) -> i32 {
        if self.dry_run || self.converted == self.total {
            EXIT_OK
        } else {
            EXIT_PARTIAL_FAILURE
        }
    }
}

/// List the `.drawio` files directly inside `dir`, sorted by path.
pub fn find_drawio_files(dir: &Path) -> Result<Vec<PathBuf>, DrawportError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("drawio")
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Plan the conversions for every diagram in `dir`.
pub fn plan(dir: &Path) -> Result<Vec<PlannedConversion>, DrawportError> {
    Ok(find_drawio_files(dir)?
        .into_iter()
        .map(PlannedConversion::new)
        .collect())
}

/// Batch SVG + EMF conversion.
#[derive(Debug, Clone)]
pub struct Pipeline {
    converter: Converter,
}

impl Pipeline {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }

    /// Tools that must be present before the run starts.
    pub fn required_tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();
        if self.converter.config().svg_backend == SvgBackend::Drawio {
            tools.push(Tool::Drawio);
        }
        tools.push(self.converter.config().emf_backend.tool());
        tools
    }

    /// Convert every diagram in `diagrams_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error before touching any file if a required tool is
    /// missing or `diagrams_dir` does not exist. Per-file failures are
    /// collected in the report instead.
    pub async fn run(
        &self,
        diagrams_dir: &Path,
        dry_run: bool,
    ) -> Result<PipelineReport, DrawportError> {
        // Resolve all tools up front so no half-converted batch is left behind.
        let missing: Vec<DrawportError> = self
            .required_tools()
            .into_iter()
            .filter_map(|tool| self.converter.resolve(tool).err())
            .collect();
        for err in &missing {
            if let DrawportError::ToolNotFound { tool, candidate } = err {
                error!(
                    tool = tool.display_name(),
                    candidate = candidate.as_str(),
                    env_var = tool.env_var();
                    "CLI not found. Install it or set the environment variable to the executable path"
                );
            }
        }
        if let Some(err) = missing.into_iter().next() {
            return Err(err);
        }

        info!(diagrams_dir = diagrams_dir.display().to_string(); "Looking for .drawio files");
        if !diagrams_dir.is_dir() {
            error!(diagrams_dir = diagrams_dir.display().to_string(); "Diagrams directory not found");
            return Err(DrawportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("diagrams directory not found at {}", diagrams_dir.display()),
            )));
        }

        let planned = plan(diagrams_dir)?;
        let mut report = PipelineReport {
            total: planned.len(),
            dry_run,
            ..PipelineReport::default()
        };

        if planned.is_empty() {
            info!("No .drawio files found. Nothing to do.");
            return Ok(report);
        }

        if dry_run {
            info!("Dry run enabled. No files will be converted.");
            for item in &planned {
                info!(
                    "{} -> {} -> {}",
                    file_name(&item.input),
                    file_name(&item.svg),
                    file_name(&item.emf)
                );
            }
            info!("Dry run completed. Rerun without --dry-run to perform conversions.");
            return Ok(report);
        }

        for item in planned {
            info!(input_path = item.input.display().to_string(); "Processing {}", file_name(&item.input));
            match self
                .converter
                .drawio_to_emf(&item.input, &item.svg, &item.emf)
                .await
            {
                Ok(_) => report.converted += 1,
                Err(err) => {
                    warn!(input_path = item.input.display().to_string(), err:err; "Diagram failed");
                    report.failures.push((item.input, err));
                }
            }
        }

        info!(
            converted = report.converted,
            total = report.total;
            "Completed. {}/{} diagrams converted successfully.",
            report.converted,
            report.total
        );
        Ok(report)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
