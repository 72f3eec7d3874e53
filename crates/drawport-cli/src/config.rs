//! Locating and reading the TOML settings file.
//!
//! `--config` wins outright. Without it the working directory's
//! `drawport/config.toml` is tried, then `config.toml` in the user's
//! configuration directory. If neither exists the built-in defaults apply,
//! so a bare `drawport check` works on a fresh machine.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use drawport::config::AppConfig;

/// Settings file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "drawport/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Settings file {0} does not exist")]
    MissingFile(PathBuf),

    #[error("Cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How a settings file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Flag,
    WorkingDir,
    UserConfigDir,
}

impl Origin {
    fn as_str(self) -> &'static str {
        match self {
            Origin::Flag => "--config",
            Origin::WorkingDir => "working directory",
            Origin::UserConfigDir => "user config directory",
        }
    }
}

/// Load the settings for this run.
///
/// # Errors
///
/// An explicit path that does not exist is [`ConfigError::MissingFile`].
/// A file that is found but unreadable or malformed is also an error; it is
/// never silently replaced by defaults.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    let explicit = explicit_path.as_ref().map(|p| p.as_ref());

    match locate(explicit)? {
        Some((origin, path)) => {
            info!(origin = origin.as_str(), path = path.display().to_string(); "Reading settings");
            parse_file(&path)
        }
        None => {
            debug!("No settings file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn locate(explicit: Option<&Path>) -> Result<Option<(Origin, PathBuf)>, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        return Ok(Some((Origin::Flag, path.to_path_buf())));
    }

    let user_config = ProjectDirs::from("com", "drawport", "drawport")
        .map(|dirs| dirs.config_dir().join("config.toml"));
    if user_config.is_none() {
        debug!("No user config directory on this platform");
    }

    let found = [
        (Origin::WorkingDir, Some(PathBuf::from(LOCAL_CONFIG))),
        (Origin::UserConfigDir, user_config),
    ]
    .into_iter()
    .filter_map(|(origin, path)| Some((origin, path?)))
    .find(|(_, path)| path.is_file());

    Ok(found)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
