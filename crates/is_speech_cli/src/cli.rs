//! Command-line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Icelandic speech from the command line
#[derive(Debug, Parser)]
#[command(name = "is-speech")]
#[command(author, version, about = "Icelandic text-to-speech and speech-to-text", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (defaults to <config dir>/is-speech-cli/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synthesize Icelandic speech from text
    ///
    /// Text comes from --text, --input_file, or piped stdin (exactly one).
    /// Example: is-speech tts --text "Góðan daginn" --voice Karl --mode save,play
    Tts(TtsArgs),

    /// Transcribe Icelandic speech from an audio file
    ///
    /// Example: is-speech stt --audio_file memo.m4a --output_file memo.txt
    Stt(SttArgs),
}

#[derive(Debug, Args)]
pub struct TtsArgs {
    /// Text to synthesize
    #[arg(long)]
    pub text: Option<String>,

    /// File containing the text to synthesize
    #[arg(long = "input_file", visible_alias = "input-file")]
    pub input_file: Option<PathBuf>,

    /// Voice: Dora or Karl
    #[arg(long, default_value = "Dora")]
    pub voice: String,

    /// What to do with the audio: save, play, save,play or both
    #[arg(long, default_value = "save")]
    pub mode: String,

    /// Output audio format: mp3 or wav
    #[arg(long = "audio_format", visible_alias = "audio-format", default_value = "mp3")]
    pub audio_format: String,

    /// Directory for saved audio
    #[arg(long = "output_dir", visible_alias = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// File name for saved audio, without extension
    #[arg(long, default_value = "output")]
    pub filename: String,
}

#[derive(Debug, Args)]
pub struct SttArgs {
    /// Audio file to transcribe
    #[arg(long = "audio_file", visible_alias = "audio-file")]
    pub audio_file: PathBuf,

    /// Whisper model (falls back to IS_SPEECH_CLI_IS_MODEL_PATH, then settings)
    #[arg(long = "model_path", visible_alias = "model-path")]
    pub model_path: Option<PathBuf>,

    /// Write the transcript here instead of stdout
    #[arg(long = "output_file", visible_alias = "output-file")]
    pub output_file: Option<PathBuf>,
}

/// Determine log filter level from verbosity count
#[must_use]
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
