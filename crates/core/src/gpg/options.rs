//! gpg command options.

use serde::{Deserialize, Serialize};

/// What a gpg operation is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpgAction {
    Encrypt,
    Decrypt,
}

impl GpgAction {
    /// Get the gpg command-line flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            GpgAction::Encrypt => "--encrypt",
            GpgAction::Decrypt => "--decrypt",
        }
    }
}
