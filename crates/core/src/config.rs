//! Configuration management for gpgstream.

use crate::error::{Error, Result};
use crate::gpg::{find_gpg_executable, GpgCommand};
use crate::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the gpg executable.
pub const GPG_PATH_ENV: &str = "GPG_PATH";

/// Environment variable gpg itself reads for its home directory.
pub const GNUPGHOME_ENV: &str = "GNUPGHOME";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Path to gpg executable (None = auto-detect).
    #[serde(default)]
    pub gpg_path: Option<PathBuf>,

    /// gpg home directory (None = a private temporary directory per command).
    #[serde(default)]
    pub home_dir: Option<PathBuf>,

    /// Arguments passed to every gpg invocation, before operation arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Config {
    /// Load configuration from the default config file.
    pub fn load() -> Result<Self> {
        Self::load_from(&platform::config_file_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let mut config: Config = serde_json::from_str(&contents)?;
            config.fix_invalid_values();
            Ok(config)
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Replace empty values with `None`.
    fn fix_invalid_values(&mut self) {
        if self.gpg_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.gpg_path = None;
        }
        if self.home_dir.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.home_dir = None;
        }
    }

    /// Save configuration to the default config file.
    pub fn save(&mut self) -> Result<()> {
        self.save_to(&platform::config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        self.fix_invalid_values();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Load configuration from environment variables, falling back to file/defaults.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env(|name| std::env::var_os(name));
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<std::ffi::OsString>) {
        if let Some(path) = var(GPG_PATH_ENV).filter(|p| !p.is_empty()) {
            self.gpg_path = Some(PathBuf::from(path));
        }

        if let Some(home) = var(GNUPGHOME_ENV).filter(|p| !p.is_empty()) {
            self.home_dir = Some(PathBuf::from(home));
        }
    }

    /// Build a gpg command from this configuration.
    ///
    /// A `gpg_path` without a directory part is a program name resolved
    /// through `PATH` at spawn time; only real paths must exist up front.
    /// Without a configured home directory the command gets a private
    /// temporary one that is removed once the command is dropped.
    pub fn command(&self) -> Result<GpgCommand> {
        let program = match &self.gpg_path {
            Some(path) if has_dir_part(path) && !path.exists() => {
                return Err(Error::Config(format!("gpg_path does not exist: {:?}", path)));
            }
            Some(path) => Some(path.clone()),
            None => find_gpg_executable().ok(),
        };

        GpgCommand::new(program)
            .with_args(&self.extra_args)
            .with_home_dir(self.home_dir.clone())
    }
}

fn has_dir_part(path: &Path) -> bool {
    path.parent().is_some_and(|parent| !parent.as_os_str().is_empty())
}
