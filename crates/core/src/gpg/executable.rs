//! gpg executable lookup on `PATH`.

use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Program names tried in order; GnuPG 2 is installed as `gpg2` on some systems.
const CANDIDATES: &[&str] = &["gpg", "gpg2"];

/// Find gpg on the process search path.
pub fn find_gpg_executable() -> Result<PathBuf> {
    let path = std::env::var_os("PATH").ok_or(Error::GpgNotFound)?;
    let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
    search(&dirs).ok_or(Error::GpgNotFound)
}

fn search(dirs: &[PathBuf]) -> Option<PathBuf> {
    let found = CANDIDATES.iter().find_map(|name| {
        dirs.iter()
            .map(|dir| dir.join(file_name(name)))
            .find(|candidate| candidate.is_file())
    });
    debug!("gpg lookup on PATH: {:?}", found);
    found
}

fn file_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(file_name(name));
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_prefers_gpg_over_gpg2() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(&first, "gpg2");
        let gpg = touch(&second, "gpg");

        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(search(&dirs), Some(gpg));
    }

    #[test]
    fn test_falls_back_to_gpg2() {
        let dir = TempDir::new().unwrap();
        let gpg2 = touch(&dir, "gpg2");

        assert_eq!(search(&[dir.path().to_path_buf()]), Some(gpg2));
    }

    #[test]
    fn test_directories_are_not_executables() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(file_name("gpg"))).unwrap();

        assert_eq!(search(&[dir.path().to_path_buf()]), None);
    }

    #[test]
    fn test_nothing_found() {
        let dir = TempDir::new().unwrap();
        assert_eq!(search(&[dir.path().to_path_buf()]), None);
        assert_eq!(search(&[]), None);
    }
}
