//! Types for speech processing
//!
//! Contains data structures for audio data, formats, voices and transcriptions.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    Mp3,
    /// WAV format (uncompressed)
    Wav,
    /// FLAC format (lossless)
    Flac,
    /// OGG container (typically Vorbis)
    Ogg,
    /// Opus codec
    Opus,
    /// WebM format
    Webm,
    /// M4A/AAC format (iPhone voice memos)
    M4a,
}

impl AudioFormat {
    /// Formats the synthesis backend can produce
    pub const SYNTHESIS_FORMATS: [Self; 2] = [Self::Mp3, Self::Wav];

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Webm => "webm",
            Self::M4a => "m4a",
        }
    }

    /// Parse audio format from a file extension (case-insensitive, without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().to_ascii_lowercase().as_str() {
            "mp3" | "mpga" | "mpeg" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            "flac" => Some(Self::Flac),
            "ogg" | "oga" => Some(Self::Ogg),
            "opus" => Some(Self::Opus),
            "webm" => Some(Self::Webm),
            "m4a" | "mp4" | "aac" => Some(Self::M4a),
            _ => None,
        }
    }

    /// Detect the audio format of a file from its extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Check if whisper.cpp can decode this format without conversion
    #[must_use]
    pub const fn is_whisper_native(&self) -> bool {
        matches!(self, Self::Wav | Self::Mp3 | Self::Flac)
    }

    /// Check if the synthesis backend can produce this format
    #[must_use]
    pub const fn is_synthesis_supported(&self) -> bool {
        matches!(self, Self::Mp3 | Self::Wav)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unknown audio format: {s}"))
    }
}

/// Icelandic voices offered by the synthesis backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Voice {
    /// Female voice
    #[default]
    Dora,
    /// Male voice
    Karl,
}

impl Voice {
    /// All voices, in display order
    pub const ALL: [Self; 2] = [Self::Dora, Self::Karl];

    /// Canonical voice identifier sent to the backend
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Dora => "Dora",
            Self::Karl => "Karl",
        }
    }

    /// BCP 47 language code of the voice
    #[must_use]
    pub const fn language_code(&self) -> &'static str {
        "is-IS"
    }

    /// Comma-separated list of voice names, for error messages
    #[must_use]
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(Self::id)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|voice| voice.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("voice must be one of: {}", Self::names()))
    }
}

/// Container for audio data with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Raw audio bytes
    data: Vec<u8>,
    /// Audio format
    format: AudioFormat,
    /// Sample rate in Hz (if known)
    sample_rate: Option<u32>,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            data,
            format,
            sample_rate: None,
        }
    }

    /// Create audio data with sample rate
    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the sample rate (if known)
    #[must_use]
    pub const fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Generate a filename with appropriate extension
    #[must_use]
    pub fn filename(&self, base: &str) -> String {
        format!("{}.{}", base, self.format.extension())
    }
}

/// Result of speech-to-text transcription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Language (ISO 639-1 code)
    pub language: Option<String>,
}

impl Transcription {
    /// Create a simple transcription with just text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    /// Set the language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check if transcription is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
