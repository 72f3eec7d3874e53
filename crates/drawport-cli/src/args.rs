//! Command-line argument definitions for the Drawport CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the configuration file and the
//! logging verbosity; each subcommand carries its own overrides.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use drawport::OutputFormat;

/// Command-line arguments for the Drawport tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a single .drawio file
    Convert(ConvertArgs),

    /// Convert every .drawio file in a directory to SVG and EMF
    Batch(BatchArgs),

    /// Run the HTTP conversion service
    Serve(ServeArgs),

    /// Report which external tools can be found
    Check,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Path to the input .drawio file
    pub input: PathBuf,

    /// Output format (svg, emf, png)
    #[arg(short, long, default_value = "svg")]
    pub format: OutputFormat,

    /// Output path (defaults to the input path with the format's extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a page-sized placeholder SVG instead of calling draw.io
    #[arg(long)]
    pub placeholder: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct BatchArgs {
    /// Directory containing .drawio files
    #[arg(long)]
    pub diagrams_dir: Option<PathBuf>,

    /// Path to the draw.io CLI executable (or set DRAWIO_CLI)
    #[arg(long)]
    pub drawio_cli: Option<String>,

    /// Path to the Inkscape executable (or set INKSCAPE_CLI)
    #[arg(long)]
    pub inkscape_cli: Option<String>,

    /// Verify the tools and list planned conversions without writing any files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}
