//! gpg subprocess management.
//!
//! This module provides functionality for:
//! - Finding the gpg executable
//! - Building gpg command lines with an optional scoped home directory
//! - Running gpg synchronously or streaming its stdout
//! - Importing keys and reading key ids from colon-format listings

mod command;
mod executable;
mod import;
mod listing;
mod options;
mod output;
mod process;

pub use command::{GpgCommand, HomeDir, DEFAULT_PROGRAM};
pub use executable::find_gpg_executable;
pub use import::{import_key, ImportedKeyFile, Key};
pub use listing::key_id_of;
pub use options::GpgAction;
pub use output::{extract_field, ColonFields, KeyId, KEY_ID_FIELD};
pub use process::{
    run, run_checked, run_checked_with_input, run_with_input, stream_stdout, Output, ProcessSpec,
    StdoutStream,
};
