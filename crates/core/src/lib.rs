//! gpgstream core library.
//!
//! This crate drives `gpg` as a managed subprocess, including:
//! - Incremental command building with a scoped home directory
//! - Synchronous process execution and pull-based stdout streaming
//! - Key import through temp files that never outlive their scope
//! - Lazy parsing of `--with-colons` output
//!
//! It is used by the `gpgstream` command-line tool.

pub mod config;
pub mod error;
pub mod gpg;
pub mod platform;
pub mod scope;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use gpg::{import_key, GpgAction, GpgCommand, ImportedKeyFile, Key, KeyId, ProcessSpec};
