//! gpg command builder.

use super::process::{Output, ProcessSpec};
use crate::error::{Error, Result};
use crate::scope;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// Program name used when no explicit path is given, resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "gpg";

/// Home directory state of a [`GpgCommand`].
#[derive(Debug, Clone, Default)]
pub enum HomeDir {
    /// No `--homedir` has been passed yet.
    #[default]
    Unconfigured,
    /// `--homedir <path>` is part of the accumulated arguments.
    Configured {
        /// The directory gpg will use.
        path: PathBuf,
        /// Set when the directory was created by us; removed with the last clone.
        scratch: Option<Arc<TempDir>>,
    },
}

impl HomeDir {
    /// The configured path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            HomeDir::Unconfigured => None,
            HomeDir::Configured { path, .. } => Some(path),
        }
    }
}

/// Accumulating description of a gpg invocation.
///
/// Each step takes `self` and returns the extended command; arguments are only
/// ever appended, so the order of steps is the order on the command line.
#[derive(Debug, Clone)]
pub struct GpgCommand {
    program: PathBuf,
    args: Vec<OsString>,
    home: HomeDir,
    output: Output,
}

impl Default for GpgCommand {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GpgCommand {
    /// Start a command for `program`, or for [`DEFAULT_PROGRAM`] if `None`.
    pub fn new(program: Option<PathBuf>) -> Self {
        Self {
            program: program.unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
            args: Vec::new(),
            home: HomeDir::Unconfigured,
            output: Output::default(),
        }
    }

    /// Start a command for the gpg found by [`super::find_gpg_executable`].
    pub fn discover() -> Result<Self> {
        Ok(Self::new(Some(super::find_gpg_executable()?)))
    }

    /// Append arguments after those already configured.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append a single argument.
    pub fn with_arg(self, arg: impl AsRef<OsStr>) -> Self {
        self.with_args([arg])
    }

    /// Set how output of realized processes is wired.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Configure the gpg home directory.
    ///
    /// With `Some(path)` that directory is used as is. With `None` a private
    /// temporary directory is created; it lives as long as this command or any
    /// clone of it.
    pub fn with_home_dir(mut self, path: Option<PathBuf>) -> Result<Self> {
        if let HomeDir::Configured { .. } = self.home {
            return Err(Error::HomeDirAlreadyConfigured);
        }

        let (path, scratch) = match path {
            Some(path) => (path, None),
            None => {
                let dir = scope::temp_dir(scope::TEMP_PREFIX)?;
                (dir.path().to_path_buf(), Some(Arc::new(dir)))
            }
        };

        debug!("Using gpg home directory: {:?}", path);
        self.args.push(OsString::from("--homedir"));
        self.args.push(path.clone().into_os_string());
        self.home = HomeDir::Configured { path, scratch };
        Ok(self)
    }

    /// Program that will be executed.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments accumulated so far.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Home directory state.
    pub fn home(&self) -> &HomeDir {
        &self.home
    }

    /// The configured home directory, if any.
    pub fn home_dir(&self) -> Option<&Path> {
        self.home.path()
    }

    /// The configured home directory, or [`Error::HomeDirNotConfigured`].
    pub fn require_home_dir(&self) -> Result<&Path> {
        self.home_dir().ok_or(Error::HomeDirNotConfigured)
    }

    /// Produce the final invocation: configured arguments followed by `extra`.
    pub fn realize<I, S>(&self, extra: I) -> ProcessSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        ProcessSpec::new(&self.program)
            .args(&self.args)
            .args(extra)
            .with_output(self.output)
    }
}
