//! `stt`: transcribe an audio file

use std::io::Write;
use std::path::PathBuf;

use is_speech::{AudioData, AudioFormat, SpeechToText, expand_home};
use tracing::{Level, debug, info, instrument, warn};

use super::{ensure_parent_dir, stdout_error};
use crate::cli::SttArgs;
use crate::error::CliError;

/// A transcription request
#[derive(Debug, Clone)]
pub struct SttRequest {
    pub audio_file: PathBuf,
    pub output_file: Option<PathBuf>,
}

impl From<&SttArgs> for SttRequest {
    fn from(args: &SttArgs) -> Self {
        Self {
            audio_file: expand_home(&args.audio_file),
            output_file: args.output_file.as_deref().map(expand_home),
        }
    }
}

/// Transcribe `request.audio_file` and return the trimmed transcript
///
/// The transcript goes to `request.output_file` (followed by a newline) when
/// set, otherwise to `out`.
///
/// # Errors
///
/// Returns `CliError::MissingAudioFile` when the audio cannot be read,
/// `CliError::UnsupportedFormat` for an unknown extension or audio the model
/// cannot take, and `CliError::Write` when the transcript cannot be written.
#[instrument(skip_all, fields(audio_file = %request.audio_file.display()))]
pub async fn run_stt<W: Write>(
    stt: &dyn SpeechToText,
    request: &SttRequest,
    out: &mut W,
) -> Result<String, CliError> {
    let path = &request.audio_file;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| CliError::MissingAudioFile { path: path.clone() })?;

    let format = AudioFormat::from_path(path).ok_or_else(|| {
        CliError::UnsupportedFormat(format!(
            "cannot tell the audio format of {} from its extension",
            path.display()
        ))
    })?;

    if tracing::enabled!(Level::DEBUG) && !stt.is_available().await {
        debug!(model = stt.model_name(), "Recognition executable or model not found up front");
    }

    debug!(model = stt.model_name(), %format, bytes = bytes.len(), "Transcribing");
    let transcription = stt.transcribe(AudioData::new(bytes, format)).await?;
    if transcription.is_empty() {
        warn!("No speech recognised in {}", path.display());
    }
    let text = transcription.text.trim().to_string();

    match &request.output_file {
        Some(output) => {
            ensure_parent_dir(output)?;
            std::fs::write(output, format!("{text}\n")).map_err(|source| CliError::Write {
                path: output.clone(),
                source,
            })?;
            info!("Transcript written to {}", output.display());
        },
        None => writeln!(out, "{text}").map_err(stdout_error)?,
    }

    Ok(text)
}
