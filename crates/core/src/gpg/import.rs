//! Key import.
//!
//! Key bytes are streamed into a temp file inside the gpg home directory and
//! handed to `gpg --import`. The file's handle is closed before gpg runs.

use super::command::GpgCommand;
use super::listing::key_id_of;
use super::output::KeyId;
use super::process::run_checked;
use crate::error::Result;
use crate::scope;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info};

/// Prefix of temp files holding key material.
const KEY_FILE_PREFIX: &str = "key-";

/// Key material to import.
pub enum Key<'a> {
    /// A key stored in an existing file.
    File(PathBuf),
    /// Key bytes read from a stream.
    Reader(Box<dyn Read + 'a>),
}

impl<'a> Key<'a> {
    /// Key stored at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Key::File(path.into())
    }

    /// Key held in memory.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Key::Reader(Box::new(Cursor::new(bytes.into())))
    }

    /// Key read from an arbitrary stream.
    pub fn reader(reader: impl Read + 'a) -> Self {
        Key::Reader(Box::new(reader))
    }

    fn open(self) -> io::Result<Box<dyn Read + 'a>> {
        match self {
            Key::File(path) => Ok(Box::new(File::open(path)?)),
            Key::Reader(reader) => Ok(reader),
        }
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::File(path) => f.debug_tuple("File").field(path).finish(),
            Key::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Key file materialized inside the gpg home directory.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ImportedKeyFile {
    path: TempPath,
}

impl ImportedKeyFile {
    /// Location of the materialized key.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the key file and return its id.
    pub fn key_id(&self, cmd: &GpgCommand) -> Result<Option<KeyId>> {
        key_id_of(self.path(), cmd)
    }
}

/// Import `key` into the home directory configured on `cmd`.
pub fn import_key(key: Key<'_>, cmd: &GpgCommand) -> Result<ImportedKeyFile> {
    let home = cmd.require_home_dir()?;
    debug!("Importing {:?} into {:?}", key, home);

    let mut source = key.open()?;
    let mut file = scope::temp_file_in(home, KEY_FILE_PREFIX)?;
    let written = io::copy(&mut source, file.as_file_mut())?;
    file.as_file_mut().flush()?;
    drop(source);

    // Close the handle; the path guard still removes the file.
    let path = file.into_temp_path();
    debug!("Wrote {} key bytes to {:?}", written, path);

    run_checked(&cmd.realize([OsStr::new("--import"), path.as_os_str()]))?;

    info!("Imported key from {:?}", path);
    Ok(ImportedKeyFile { path })
}
