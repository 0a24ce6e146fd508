//! Common test utilities for integration tests.
//!
//! Provides logging setup and a fake `gpg` that records what it was asked to
//! do, so import and listing can be exercised without GnuPG installed.

use gpgstream_core::GpgCommand;
use std::path::{Path, PathBuf};

/// Initialize test logging with appropriate filters.
///
/// Safe to call multiple times (subsequent calls are no-ops).
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gpgstream_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A shell script standing in for gpg.
///
/// On `--import FILE` it copies FILE to `captured`. On `--with-colons` it
/// prints `listing` as a single line. It always exits with `exit_code`.
#[allow(dead_code)]
pub struct FakeGpg {
    pub script: PathBuf,
    pub captured: PathBuf,
}

#[allow(dead_code)]
impl FakeGpg {
    pub fn write(dir: &Path, listing: &str, exit_code: i32) -> Self {
        let script = dir.join("fake-gpg.sh");
        let captured = dir.join("captured.key");
        let body = format!(
            r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --import)
      cp "$2" '{captured}' || exit 90
      shift ;;
    --with-colons)
      printf '%s\n' '{listing}' ;;
  esac
  shift
done
exit {exit_code}
"#,
            captured = captured.display(),
            listing = listing,
            exit_code = exit_code,
        );
        std::fs::write(&script, body).expect("write fake gpg");
        Self { script, captured }
    }

    /// A command that runs this script through `sh`.
    ///
    /// The script is never exec'd directly: a freshly written executable can
    /// fail with ETXTBSY while other test threads fork.
    pub fn command(&self) -> GpgCommand {
        GpgCommand::new(Some(PathBuf::from("sh"))).with_arg(&self.script)
    }
}
