//! Subcommand handlers
//!
//! Handlers take the speech ports and a writer for standard output so they can
//! be driven with fakes.

mod stt;
mod tts;

use std::path::Path;

pub use stt::{SttRequest, run_stt};
pub use tts::{TtsOutcome, TtsRequest, run_tts};

use crate::error::CliError;

/// Create the parent directory of `path` if it has one
fn ensure_parent_dir(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| CliError::Write {
                path: parent.to_path_buf(),
                source,
            })
        },
        _ => Ok(()),
    }
}

/// Map a failed write to standard output
fn stdout_error(source: std::io::Error) -> CliError {
    CliError::Write {
        path: "<stdout>".into(),
        source,
    }
}
