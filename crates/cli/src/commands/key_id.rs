//! Key id command - prints the id of a key file.

use anyhow::{bail, Result};
use gpgstream_core::{gpg::key_id_of, Config};
use std::path::Path;

pub fn execute(key: &Path) -> Result<()> {
    if !key.is_file() {
        bail!("key file not found: {}", key.display());
    }

    let config = Config::load_with_env()?;
    let cmd = config.command()?;

    match key_id_of(key, &cmd)? {
        Some(id) => println!("{}", id),
        None => bail!("no key id found in {}", key.display()),
    }

    Ok(())
}
