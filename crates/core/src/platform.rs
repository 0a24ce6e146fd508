//! Cross-platform paths.

use std::path::PathBuf;

const APP_DIR: &str = "gpgstream";

/// Get the configuration directory.
///
/// - Linux: `~/.config/gpgstream`
/// - Windows: `%APPDATA%\gpgstream`
/// - macOS: `~/Library/Application Support/gpgstream`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Get the path to the main config file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_under_config_dir() {
        let file = config_file_path();
        assert_eq!(file.parent(), Some(config_dir().as_path()));
        assert!(config_dir().ends_with(APP_DIR));
    }
}
