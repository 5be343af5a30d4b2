//! Audio format converter for speech processing
//!
//! Converts recordings whisper.cpp cannot decode itself (M4A voice memos,
//! Opus, WebM, ...) into 16 kHz mono WAV with FFmpeg.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat};

/// Sample rate whisper.cpp expects
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Audio converter for transforming between audio formats
///
/// Uses FFmpeg for audio conversion. FFmpeg must be installed on the system.
#[derive(Debug, Clone, Default)]
pub struct AudioConverter {
    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    ffmpeg_path: Option<String>,
}

impl AudioConverter {
    /// Create a new audio converter with default settings
    #[must_use]
    pub const fn new() -> Self {
        Self { ffmpeg_path: None }
    }

    /// Create a new audio converter with a custom FFmpeg path
    #[must_use]
    pub fn with_ffmpeg_path(path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: Some(path.into()),
        }
    }

    /// Get the FFmpeg binary path
    fn ffmpeg_path(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or("ffmpeg")
    }

    /// Check if FFmpeg is available on the system
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        Command::new(self.ffmpeg_path())
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    /// Re-encode audio into `target` with FFmpeg
    ///
    /// Input and output go through files in a private temp dir, so FFmpeg
    /// can seek (M4A with a trailing `moov` atom) and nothing outlives the
    /// call. Audio already in `target` is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::AudioProcessing` if FFmpeg cannot be spawned,
    /// exits unsuccessfully or produces no output.
    #[instrument(skip(self, audio), fields(from = %audio.format(), to = %target))]
    pub async fn convert(
        &self,
        audio: &AudioData,
        target: AudioFormat,
    ) -> Result<AudioData, SpeechError> {
        if audio.format() == target {
            debug!("Already {}, nothing to convert", target);
            return Ok(audio.clone());
        }

        let work_dir = tempfile::tempdir().map_err(|e| {
            SpeechError::AudioProcessing(format!("Failed to create temp dir: {e}"))
        })?;
        let input_path = work_dir.path().join(audio.filename("input"));
        let output_path = work_dir
            .path()
            .join(format!("converted.{}", target.extension()));

        tokio::fs::write(&input_path, audio.data())
            .await
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to stage input: {e}")))?;

        let output = Command::new(self.ffmpeg_path())
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(&input_path)
            .args(encoder_args(target))
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            return Err(SpeechError::AudioProcessing(format!(
                "FFmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let converted = tokio::fs::read(&output_path).await.map_err(|e| {
            SpeechError::AudioProcessing(format!("FFmpeg output missing: {e}"))
        })?;

        if converted.is_empty() {
            return Err(SpeechError::AudioProcessing(
                "FFmpeg produced no audio".to_string(),
            ));
        }

        debug!(bytes = converted.len(), "Converted");

        let converted = AudioData::new(converted, target);
        Ok(match target {
            AudioFormat::Wav => converted.with_sample_rate(WHISPER_SAMPLE_RATE),
            _ => converted,
        })
    }

    /// Make audio readable by whisper.cpp
    ///
    /// WAV, MP3 and FLAC pass through untouched; anything else becomes
    /// 16 kHz mono WAV.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::UnsupportedFormat` if conversion is needed but
    /// FFmpeg is not installed, or `SpeechError::AudioProcessing` if the
    /// conversion itself fails.
    #[instrument(skip(self, audio), fields(format = %audio.format()))]
    pub async fn prepare_for_whisper(&self, audio: AudioData) -> Result<AudioData, SpeechError> {
        if audio.format().is_whisper_native() {
            return Ok(audio);
        }

        if !self.is_available().await {
            return Err(SpeechError::UnsupportedFormat(format!(
                "{} cannot be decoded by whisper.cpp and '{}' is not available for conversion",
                audio.format(),
                self.ffmpeg_path()
            )));
        }

        self.convert(&audio, AudioFormat::Wav).await
    }
}

/// Muxer and encoder arguments for an output format
const fn encoder_args(target: AudioFormat) -> &'static [&'static str] {
    match target {
        AudioFormat::Wav => &["-f", "wav", "-c:a", "pcm_s16le", "-ar", "16000", "-ac", "1"],
        AudioFormat::Mp3 => &["-f", "mp3", "-c:a", "libmp3lame", "-q:a", "2"],
        AudioFormat::Flac => &["-f", "flac", "-c:a", "flac"],
        AudioFormat::Ogg => &["-f", "ogg", "-c:a", "libvorbis", "-q:a", "4"],
        AudioFormat::Webm => &["-f", "webm", "-c:a", "libopus", "-b:a", "32k"],
        AudioFormat::Opus => &["-f", "opus", "-c:a", "libopus", "-b:a", "32k"],
        AudioFormat::M4a => &["-f", "ipod", "-c:a", "aac", "-b:a", "128k"],
    }
}
