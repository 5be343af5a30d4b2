//! Text input resolution for `tts`

use std::io::{IsTerminal, Read};
use std::path::Path;

use is_speech::expand_home;

use crate::cli::TtsArgs;
use crate::error::CliError;

/// Text for a `tts` run from its options and whatever was piped in
///
/// Piped input counts as a source even when `--text` or `--input_file` is
/// given, so supplying both is rejected rather than silently ignored.
///
/// # Errors
///
/// See [`resolve_text`].
pub fn resolve_tts_text(args: &TtsArgs, stdin: Option<String>) -> Result<String, CliError> {
    resolve_text(args.text.as_deref(), args.input_file.as_deref(), stdin)
}

/// Pick the text to synthesize from exactly one source
///
/// `stdin` is the already-read standard input, if it was consulted at all.
///
/// # Errors
///
/// Returns `CliError::NoInputText` unless exactly one source yields
/// non-whitespace text, and `CliError::ReadInput` if `input_file` cannot be
/// read.
pub fn resolve_text(
    text: Option<&str>,
    input_file: Option<&Path>,
    stdin: Option<String>,
) -> Result<String, CliError> {
    let file_text = input_file
        .map(|path| {
            let path = expand_home(path);
            std::fs::read_to_string(&path).map_err(|source| CliError::ReadInput { path, source })
        })
        .transpose()?;

    let mut sources = [text.map(str::to_string), file_text, stdin]
        .into_iter()
        .flatten()
        .filter(|candidate| !candidate.trim().is_empty());

    match (sources.next(), sources.next()) {
        (Some(only), None) => Ok(only),
        _ => Err(CliError::NoInputText),
    }
}

/// Read piped standard input
///
/// Returns `None` when stdin is a terminal, so an interactive run never blocks.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read as UTF-8.
pub fn read_piped_stdin() -> std::io::Result<Option<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}
