//! Error types for the core library.

use crate::gpg::ProcessSpec;
use thiserror::Error;

/// Main error type for the core library.
#[derive(Error, Debug)]
pub enum Error {
    /// gpg executable not found
    #[error("gpg executable not found. Please install GnuPG: https://gnupg.org/download/")]
    GpgNotFound,

    /// The process could not be started at all.
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        /// Program that was being started.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process ran but did not exit successfully.
    #[error("`{spec}` failed ({})", describe_exit(.code))]
    ProcessFailed {
        /// The invocation that failed.
        spec: ProcessSpec,
        /// Exit code, `None` if the process was terminated by a signal.
        code: Option<i32>,
        /// Captured stderr, empty when output was not captured.
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation needed a home directory but none was configured.
    #[error("gpg home directory is not configured")]
    HomeDirNotConfigured,

    /// A home directory was configured twice on the same command.
    #[error("gpg home directory is already configured")]
    HomeDirAlreadyConfigured,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Exit code of a failed process, if this is a [`Error::ProcessFailed`].
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ProcessFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
