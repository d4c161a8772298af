//! Configuration resolution.
//!
//! Locates the store root and keyring directory. Sources, lowest priority
//! first:
//! 1. Built-in defaults (`~/.cellar`, `<config dir>/cellar/keyring`)
//! 2. `<config dir>/cellar/config.toml`
//! 3. `CELLAR_DIR` / `CELLAR_KEYRING` environment variables

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::cipher::Age;
use crate::core::constants;
use crate::core::repository::Repository;
use crate::core::store::Filesystem;
use crate::error::{ConfigError, Result};

/// Optional overrides read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Store root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    /// Keyring directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyring_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Parse `config.toml` contents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed or has unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents).map_err(ConfigError::Parse)?)
    }

    /// Read `path`, treating a missing file as empty.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loading config");
                Self::from_toml(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
            .into()),
        }
    }
}

/// Resolved locations for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store root directory.
    pub store_dir: PathBuf,
    /// Keyring directory.
    pub keyring_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from the process environment and platform dirs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if a default is needed but the home
    /// or config directory is unknown, or a config file error.
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir().map(|d| d.join(constants::APP_DIR));
        let file = match &config_dir {
            Some(dir) => FileConfig::load(&dir.join(constants::CONFIG_FILE))?,
            None => FileConfig::default(),
        };

        Self::resolve(
            file,
            |name| std::env::var_os(name).map(PathBuf::from),
            dirs::home_dir(),
            config_dir,
        )
    }

    /// Resolve configuration from explicit sources.
    ///
    /// # Arguments
    ///
    /// * `file` - Overrides read from `config.toml`
    /// * `env` - Environment lookup
    /// * `home` - Home directory, for the default store location
    /// * `app_config_dir` - `<config dir>/cellar`, for the default keyring location
    pub fn resolve<E>(
        file: FileConfig,
        env: E,
        home: Option<PathBuf>,
        app_config_dir: Option<PathBuf>,
    ) -> Result<Self>
    where
        E: Fn(&str) -> Option<PathBuf>,
    {
        let store_dir = match env(constants::STORE_DIR_ENV).or(file.store_dir) {
            Some(dir) => dir,
            None => home
                .ok_or(ConfigError::NoHomeDir)?
                .join(constants::STORE_DIR),
        };

        let keyring_dir = match env(constants::KEYRING_DIR_ENV).or(file.keyring_dir) {
            Some(dir) => dir,
            None => app_config_dir
                .ok_or(ConfigError::NoHomeDir)?
                .join(constants::KEYRING_DIR),
        };

        debug!(
            store = %store_dir.display(),
            keyring = %keyring_dir.display(),
            "config resolved"
        );

        Ok(Self {
            store_dir,
            keyring_dir,
        })
    }

    /// Build a disk-backed repository using the age keyring.
    pub fn repository(&self) -> Repository<Filesystem, Age> {
        Repository::new(
            Filesystem::new(&self.store_dir),
            Age::new(&self.keyring_dir),
        )
    }
}
