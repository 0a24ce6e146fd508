//! Key id lookup through `gpg --with-colons`.

use super::command::GpgCommand;
use super::output::{extract_field, KeyId, KEY_ID_FIELD};
use super::process::stream_stdout;
use crate::error::Result;
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;

/// List the key material at `path` and return the id from the first line.
///
/// A gpg failure is reported even when a field was extracted, so a partial
/// listing is never mistaken for a valid one.
pub fn key_id_of(path: &Path, cmd: &GpgCommand) -> Result<Option<KeyId>> {
    let spec = cmd.realize([
        OsStr::new("--batch"),
        OsStr::new("--with-colons"),
        path.as_os_str(),
    ]);

    let mut stream = stream_stdout(&spec)?;
    let key_id = extract_field(&mut stream, KEY_ID_FIELD)?;
    stream.finish()?;

    debug!("Key id of {:?}: {:?}", path, key_id);
    Ok(key_id)
}
