//! `tts`: synthesize, then save and/or play

use std::io::Write;
use std::path::{Path, PathBuf};

use is_speech::{AudioData, AudioFormat, TextToSpeech, Voice, expand_home};
use tracing::{Level, debug, info, instrument};

use super::{ensure_parent_dir, stdout_error};
use crate::cli::TtsArgs;
use crate::error::CliError;
use crate::mode::ModeSet;
use crate::playback::{AudioPlayer, PlaybackOutcome};

/// A validated synthesis request
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub voice: Voice,
    pub mode: ModeSet,
    pub format: AudioFormat,
    pub output_dir: PathBuf,
    pub filename: String,
}

impl TtsRequest {
    /// Validate the command-line options and attach the resolved text
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidMode`, `CliError::InvalidVoice` or
    /// `CliError::InvalidAudioFormat` for bad option values.
    pub fn from_args(args: &TtsArgs, text: String) -> Result<Self, CliError> {
        Ok(Self {
            text,
            voice: parse_voice(&args.voice)?,
            mode: ModeSet::resolve(&args.mode)?,
            format: parse_format(&args.audio_format)?,
            output_dir: expand_home(&args.output_dir),
            filename: args.filename.clone(),
        })
    }

    /// `{output_dir}/{filename}.{ext}`
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.filename, self.format.extension()))
    }
}

/// Parse `--voice`
fn parse_voice(raw: &str) -> Result<Voice, CliError> {
    raw.parse().map_err(|reason| CliError::InvalidVoice {
        voice: raw.to_string(),
        reason,
    })
}

/// Parse `--audio_format`, accepting only what the synthesis backend produces
fn parse_format(raw: &str) -> Result<AudioFormat, CliError> {
    raw.parse::<AudioFormat>()
        .ok()
        .filter(AudioFormat::is_synthesis_supported)
        .ok_or_else(|| CliError::InvalidAudioFormat(raw.to_string()))
}

/// Result of a successful `tts` run
#[derive(Debug, Clone, Default)]
pub struct TtsOutcome {
    /// Where the audio was written, when saving was requested
    pub saved: Option<PathBuf>,
    /// What happened on playback, when playing was requested
    pub playback: Option<PlaybackOutcome>,
}

impl TtsOutcome {
    /// Non-fatal playback warning, if any
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        self.playback.as_ref().and_then(PlaybackOutcome::warning)
    }
}

/// Synthesize `request.text`, then save and/or play the audio
///
/// Saving happens before playback. `Saved: <path>` is written to `out`.
///
/// # Errors
///
/// Returns `CliError::Speech` when synthesis fails and `CliError::Write` when
/// the audio cannot be written. Playback problems are reported in the outcome.
#[instrument(
    skip_all,
    fields(voice = %request.voice, format = %request.format, mode = %request.mode)
)]
pub async fn run_tts<W: Write>(
    tts: &dyn TextToSpeech,
    player: &dyn AudioPlayer,
    request: &TtsRequest,
    out: &mut W,
) -> Result<TtsOutcome, CliError> {
    if tracing::enabled!(Level::DEBUG) && !tts.is_available().await {
        debug!(backend = tts.name(), "Synthesis backend did not answer its availability check");
    }

    debug!(backend = tts.name(), chars = request.text.chars().count(), "Synthesizing");
    let audio = tts
        .synthesize(&request.text, request.voice, request.format)
        .await?;
    info!(
        bytes = audio.size_bytes(),
        sample_rate = ?audio.sample_rate(),
        "Synthesis complete"
    );

    let mut outcome = TtsOutcome::default();

    if request.mode.save() {
        let path = request.output_path();
        save_audio(&audio, &path)?;
        writeln!(out, "Saved: {}", path.display()).map_err(stdout_error)?;
        outcome.saved = Some(path);
    }

    if request.mode.play() {
        let playback = match &outcome.saved {
            Some(path) => player.play(path, audio.format()).await,
            None => play_from_temp_file(player, &audio).await?,
        };
        outcome.playback = Some(playback);
    }

    Ok(outcome)
}

/// Write audio to `path`, creating parent directories and overwriting
fn save_audio(audio: &AudioData, path: &Path) -> Result<(), CliError> {
    ensure_parent_dir(path)?;
    std::fs::write(path, audio.data()).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved audio to {}", path.display());
    Ok(())
}

/// Play audio that was not saved; the temporary file is removed on return
async fn play_from_temp_file(
    player: &dyn AudioPlayer,
    audio: &AudioData,
) -> Result<PlaybackOutcome, CliError> {
    let suffix = format!(".{}", audio.format().extension());
    let write_error = |source| CliError::Write {
        path: std::env::temp_dir(),
        source,
    };

    let mut temp = tempfile::Builder::new()
        .prefix("is-speech-")
        .suffix(&suffix)
        .tempfile()
        .map_err(write_error)?;
    temp.write_all(audio.data()).map_err(write_error)?;
    temp.flush().map_err(write_error)?;

    Ok(player.play(temp.path(), audio.format()).await)
}
