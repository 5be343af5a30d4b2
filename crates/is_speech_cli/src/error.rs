//! Errors surfaced by the command handlers

use std::path::PathBuf;

use is_speech::SpeechError;
use thiserror::Error;

/// Unrecoverable errors; each one ends the run with a non-zero exit code
#[derive(Debug, Error)]
pub enum CliError {
    /// `--mode` contained an unknown token or resolved to nothing
    #[error("invalid mode '{0}': mode must be one or more of: both, play, save")]
    InvalidMode(String),

    /// Zero or several text sources supplied non-empty text
    #[error("no text provided: use exactly one of --text, --input_file, or pipe via stdin")]
    NoInputText,

    /// `--voice` is not a known voice
    #[error("invalid voice '{voice}': {reason}")]
    InvalidVoice { voice: String, reason: String },

    /// `--audio_format` is not something the synthesis backend produces
    #[error("invalid audio format '{0}': audio_format must be one of: mp3, wav")]
    InvalidAudioFormat(String),

    /// `--input_file` could not be read
    #[error("failed to read input file {}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `--audio_file` does not exist or is unreadable
    #[error("audio file not found or unreadable: {}", .path.display())]
    MissingAudioFile { path: PathBuf },

    /// Audio cannot be fed to the recognition model
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Writing audio or a transcript failed
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("failed to load settings")]
    Settings(#[from] config::ConfigError),

    /// Pass-through failure of a speech backend
    #[error(transparent)]
    Speech(SpeechError),
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::UnsupportedFormat(detail) => Self::UnsupportedFormat(detail),
            other => Self::Speech(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_speech_error_is_lifted() {
        let err = CliError::from(SpeechError::UnsupportedFormat("m4a".to_string()));
        assert!(matches!(err, CliError::UnsupportedFormat(ref d) if d == "m4a"));
    }

    #[test]
    fn other_speech_errors_pass_through() {
        let err = CliError::from(SpeechError::RateLimited);
        assert!(matches!(err, CliError::Speech(SpeechError::RateLimited)));
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn invalid_mode_message() {
        let err = CliError::InvalidMode("foo".to_string());
        assert_eq!(
            err.to_string(),
            "invalid mode 'foo': mode must be one or more of: both, play, save"
        );
    }

    #[test]
    fn missing_audio_file_message() {
        let err = CliError::MissingAudioFile {
            path: PathBuf::from("/tmp/none.mp3"),
        };
        assert_eq!(
            err.to_string(),
            "audio file not found or unreadable: /tmp/none.mp3"
        );
    }
}
