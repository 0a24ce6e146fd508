//! Scoped temporary directories and files.
//!
//! Every resource handed out here is removed when its guard is dropped, so
//! cleanup runs on normal return, on `?` propagation and while unwinding.
//! The closure forms close the resource explicitly on success so that removal
//! errors are reported instead of swallowed by `Drop`.

use std::fs::File;
use std::io;
use std::path::Path;
use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::debug;

/// Prefix used for directories and files created by this library.
pub const TEMP_PREFIX: &str = "gpgstream-";

/// Create a private temporary directory under the system temp dir.
///
/// The directory and everything inside it is removed when the guard drops.
pub fn temp_dir(prefix: &str) -> io::Result<TempDir> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    debug!("Created temp dir: {:?}", dir.path());
    Ok(dir)
}

/// Create a uniquely named file inside `dir`.
///
/// The returned handle is open for writing. Callers that hand the path to a
/// subprocess must close it first (see [`NamedTempFile::into_temp_path`]);
/// some platforms refuse to open a file another process holds for writing.
pub fn temp_file_in(dir: &Path, prefix: &str) -> io::Result<NamedTempFile> {
    let file = Builder::new().prefix(prefix).tempfile_in(dir)?;
    debug!("Created temp file: {:?}", file.path());
    Ok(file)
}

/// Run `f` with a fresh temporary directory, removing it afterwards.
pub fn with_temp_dir<T, E, F>(prefix: &str, f: F) -> Result<T, E>
where
    F: FnOnce(&Path) -> Result<T, E>,
    E: From<io::Error>,
{
    let dir = temp_dir(prefix)?;
    let value = f(dir.path())?;
    dir.close()?;
    Ok(value)
}

/// Run `f` with a fresh file inside `dir`, removing it afterwards.
pub fn with_temp_file<T, E, F>(dir: &Path, prefix: &str, f: F) -> Result<T, E>
where
    F: FnOnce(&Path, &mut File) -> Result<T, E>,
    E: From<io::Error>,
{
    let mut file = temp_file_in(dir, prefix)?;
    let path = file.path().to_path_buf();
    let value = f(&path, file.as_file_mut())?;
    file.close()?;
    Ok(value)
}
