//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. the TOML file (`--config PATH`, or `config.toml` in the platform
//!    config directory)
//! 3. `KILLDUPES_*` environment variables
//! 4. command-line flags
//!
//! ```toml
//! chunk_size = 262144
//! permanent = false
//! progress = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::engine::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "KILLDUPES_";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or had the wrong types.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("chunk_size must be at least 1 byte")]
    ZeroChunkSize,

    /// The chunk size exceeds [`MAX_CHUNK_SIZE`].
    #[error("chunk_size {0} exceeds the maximum of {max} bytes", max = MAX_CHUNK_SIZE)]
    ChunkSizeTooLarge(u64),

    /// The configuration could not be rendered as TOML.
    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest chunk read from a file at a time, in bytes.
    pub chunk_size: u64,
    /// Delete permanently instead of moving to the trash.
    pub permanent: bool,
    /// Show the progress line on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE as u64,
            permanent: false,
            progress: true,
        }
    }
}

impl Config {
    /// Load defaults, the platform config file and the environment.
    ///
    /// Problems are logged and the defaults are used instead, so a broken
    /// config file never prevents a run.
    #[must_use]
    pub fn load() -> Self {
        match Self::load_from(None) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring configuration: {e}");
                Self::default()
            }
        }
    }

    /// Load defaults, a config file and the environment.
    ///
    /// With `path` set the file must exist; otherwise the platform default
    /// file is used if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing, a layer does
    /// not parse, or a value is out of range.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_path(),
        };

        let config: Self = Self::figment(file.as_deref())
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        log::debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// The figment used by [`Config::load_from`].
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
        if cli.permanent {
            self.permanent = true;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroChunkSize`] if `chunk_size` is 0 and
    /// [`ConfigError::ChunkSizeTooLarge`] if it exceeds [`MAX_CHUNK_SIZE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::ChunkSizeTooLarge(self.chunk_size));
        }
        Ok(())
    }

    /// Render as TOML, as accepted by a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The platform-specific config file path, if a home directory is known.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "killdupes").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
