//! Configuration file support.
//!
//! Settings are taken from the command line first, then from the environment
//! (handled by clap), then from `nubops.toml` and finally from built-in
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use nubops_templates::BuildMode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::commands::Cli;

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "nubops.toml";

/// Default folder, relative to the current directory, holding template families.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Default shell lifecycle scripts run with.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Errors reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `nubops.toml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NubopsConfig {
    pub templates_dir: Option<PathBuf>,
    pub target_folder: Option<PathBuf>,
    pub mode: Option<BuildMode>,
    pub shell: Option<String>,
}

impl NubopsConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit_path` if given, otherwise `nubops.toml` in `current_dir`
    /// if it exists, otherwise use an empty configuration.
    pub fn discover(explicit_path: Option<&Path>, current_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }
        let default_path = current_dir.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Effective settings of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub templates_dir: PathBuf,
    pub target_folder: PathBuf,
    pub mode: BuildMode,
    pub shell: String,
}

impl Settings {
    /// Merge the command line with the configuration file.
    pub fn resolve(cli: &Cli, config: NubopsConfig, current_dir: &Path) -> Self {
        Self {
            templates_dir: cli
                .templates_dir
                .clone()
                .or(config.templates_dir)
                .unwrap_or_else(|| current_dir.join(DEFAULT_TEMPLATES_DIR)),
            target_folder: cli
                .target_folder
                .clone()
                .or(config.target_folder)
                .unwrap_or_else(|| PathBuf::from("/")),
            mode: cli.mode.map(BuildMode::from).or(config.mode).unwrap_or_default(),
            shell: config.shell.unwrap_or_else(|| DEFAULT_SHELL.to_string()),
        }
    }
}
