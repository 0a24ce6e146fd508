//! Import command - imports a key into the configured gpg home.

use anyhow::{Context, Result};
use gpgstream_core::{import_key, Config, Key};
use std::path::Path;
use tracing::{info, warn};

pub fn execute(key: &Path) -> Result<()> {
    let config = Config::load_with_env()?;
    let cmd = config.command().context("failed to prepare gpg command")?;

    if config.home_dir.is_none() {
        warn!("No home_dir configured; importing into a temporary gpg home");
    }

    let key = if key == Path::new("-") {
        Key::reader(std::io::stdin().lock())
    } else {
        Key::file(key)
    };

    let imported = import_key(key, &cmd)?;
    info!("Key imported");

    match imported.key_id(&cmd)? {
        Some(id) => println!("{}", id),
        None => println!("Imported, but no key id was listed"),
    }

    Ok(())
}
