//! Configuration file handling.
//!
//! The configuration is a single JSON file, by default
//! `~/.config/sextant/config.json` (or the platform equivalent). A missing
//! default file means "all defaults"; a missing file that was named on the
//! command line is an error. Command line options override file values.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use sextant_core::{GeoPosition, MessageFactoryOptions, TrackEstimationParameters};
use thiserror::Error;

use crate::receiver::Source;
use crate::Cli;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}")]
    #[diagnostic(code(sextant::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}")]
    #[diagnostic(
        code(sextant::config::parse),
        help("The file must be a JSON object, see ServerConfig for the field names")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "sextant")
}

pub fn default_config_path() -> Option<PathBuf> {
    get_project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Everything the server can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Where to read sentences from
    pub source: Option<Source>,
    pub own_mmsi: Option<u32>,
    /// Fixed own position, for a shore station or when no `!AIVDO` is received
    pub own_position: Option<GeoPosition>,
    pub decoder: MessageFactoryOptions,
    pub estimation: TrackEstimationParameters,
}

impl ServerConfig {
    /// Load from `path`, or from the default location when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => {
                    log::debug!("No configuration file, using defaults");
                    Ok(ServerConfig::default())
                }
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<ServerConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply command line overrides
    pub fn with_args(mut self, args: &Cli) -> ServerConfig {
        if let Some(source) = &args.source {
            self.source = Some(source.clone());
        }
        if args.own_mmsi.is_some() {
            self.own_mmsi = args.own_mmsi;
        }
        if args.own_position.is_some() {
            self.own_position = args.own_position;
        }
        if args.throw_on_unknown {
            self.decoder.throw_on_unknown_message = true;
        }
        self
    }

    pub fn source(&self) -> Source {
        self.source.clone().unwrap_or(Source::Stdin)
    }
}
