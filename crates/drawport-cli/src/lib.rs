//! CLI logic for the Drawport diagram converter.
//!
//! This module wires the command-line arguments to the converters, the
//! batch pipeline and the HTTP service.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, BatchArgs, Command, ConvertArgs, ServeArgs};
pub use config::ConfigError;
pub use error_adapter::ErrorAdapter;

use std::{io, path::PathBuf};

use log::{info, warn};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use drawport::{
    DrawportError,
    config::{AppConfig, SvgBackend},
    convert::Converter,
    pipeline::{EXIT_OK, EXIT_SETUP_FAILED, Pipeline},
    tool::Tool,
};
use drawport_server::ServerError;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Drawport(#[from] DrawportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Failed to start the async runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Run the Drawport CLI application
///
/// Returns the process exit code on completion. Batch runs report `2` when
/// some diagrams failed; `check` reports `1` when a tool the batch pipeline
/// needs is missing.
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading errors
/// - Missing or failing external tools
/// - Server bind or runtime errors
pub fn run(args: &Args) -> Result<i32, CliError> {
    let mut config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Convert(cmd) => {
            if cmd.placeholder {
                config.convert.svg_backend = SvgBackend::Placeholder;
            }
            let runtime = current_thread_runtime()?;
            runtime.block_on(convert(&config, cmd))?;
            Ok(EXIT_OK)
        }
        Command::Batch(cmd) => {
            apply_batch_overrides(&mut config, cmd);
            let runtime = current_thread_runtime()?;
            runtime.block_on(batch(&config, cmd.dry_run))
        }
        Command::Serve(cmd) => {
            apply_serve_overrides(&mut config, cmd);
            let runtime = Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(CliError::Runtime)?;
            runtime.block_on(drawport_server::serve(&config))?;
            Ok(EXIT_OK)
        }
        Command::Check => Ok(check(&config)),
    }
}

fn current_thread_runtime() -> Result<Runtime, CliError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

fn apply_batch_overrides(config: &mut AppConfig, cmd: &BatchArgs) {
    if let Some(dir) = &cmd.diagrams_dir {
        config.pipeline.diagrams_dir = dir.clone();
    }
    if let Some(program) = &cmd.drawio_cli {
        config.tools.set(Tool::Drawio, program.clone());
    }
    if let Some(program) = &cmd.inkscape_cli {
        config.tools.set(Tool::Inkscape, program.clone());
    }
}

fn apply_serve_overrides(config: &mut AppConfig, cmd: &ServeArgs) {
    if let Some(host) = &cmd.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
}

/// Default output location: the input path with the format's extension.
fn default_output(cmd: &ConvertArgs) -> PathBuf {
    cmd.input.with_extension(cmd.format.extension())
}

async fn convert(config: &AppConfig, cmd: &ConvertArgs) -> Result<(), DrawportError> {
    let output = cmd.output.clone().unwrap_or_else(|| default_output(cmd));
    let converter = Converter::new(config.convert.clone(), config.tools.clone());
    let written = converter.convert(&cmd.input, cmd.format, &output).await?;

    info!(output_file = written.display().to_string(); "Conversion completed");
    Ok(())
}

async fn batch(config: &AppConfig, dry_run: bool) -> Result<i32, CliError> {
    let converter = Converter::new(config.convert.clone(), config.tools.clone());
    let pipeline = Pipeline::new(converter);
    let report = pipeline.run(&config.pipeline.diagrams_dir, dry_run).await?;

    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            total = report.total;
            "Some diagrams could not be converted"
        );
        for (path, err) in &report.failures {
            warn!(input_path = path.display().to_string(); "{err}");
        }
    } else if !dry_run {
        info!(converted = report.converted; "All diagrams converted");
    }

    Ok(report.exit_code())
}

/// Print where each tool resolves to. Fails when the batch pipeline cannot run.
fn check(config: &AppConfig) -> i32 {
    let converter = Converter::new(config.convert.clone(), config.tools.clone());
    let pipeline = Pipeline::new(converter.clone());
    let required = pipeline.required_tools();

    let mut code = EXIT_OK;
    for tool in Tool::ALL {
        match converter.resolve(tool) {
            Ok(resolved) => println!("{:<12} {}", tool.display_name(), resolved.program().display()),
            Err(err) => {
                let marker = if required.contains(&tool) {
                    code = EXIT_SETUP_FAILED;
                    "required"
                } else {
                    "optional"
                };
                println!("{:<12} missing ({marker}): {err}", tool.display_name());
            }
        }
    }
    code
}
