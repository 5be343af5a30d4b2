//! Whisper.cpp Local Speech-to-Text Provider
//!
//! Implements `SpeechToText` using the whisper.cpp CLI for local transcription.
//!
//! # Prerequisites
//!
//! - whisper.cpp must be installed (`whisper-cli`, formerly `main`)
//! - An Icelandic GGML model, e.g. a conversion of
//!   `language-and-voice-lab/whisper-large-icelandic-62640-steps-967h`
//!
//! ```bash
//! git clone https://github.com/ggerganov/whisper.cpp
//! cd whisper.cpp && cmake -B build && cmake --build build -j
//! sudo cp build/bin/whisper-cli /usr/local/bin/
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use crate::config::{WhisperCppConfig, expand_home};
use crate::converter::AudioConverter;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, Transcription};

/// Output prefix handed to whisper.cpp's `-of`
const OUTPUT_STEM: &str = "transcript";

/// Local STT provider using whisper.cpp
#[derive(Debug, Clone)]
pub struct WhisperCppProvider {
    config: WhisperCppConfig,
    model_path: PathBuf,
    converter: AudioConverter,
}

impl WhisperCppProvider {
    /// Create a new whisper.cpp provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: WhisperCppConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let converter = config
            .ffmpeg_path
            .clone()
            .map_or_else(AudioConverter::new, AudioConverter::with_ffmpeg_path);
        let model_path = expand_home(&config.model_path);

        Ok(Self {
            config,
            model_path,
            converter,
        })
    }

    /// Get the whisper.cpp executable path
    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    /// Get the model path
    pub fn model(&self) -> &Path {
        &self.model_path
    }

    /// Run whisper.cpp on an audio file and return the trimmed transcript
    #[instrument(skip(self, audio_path, output_dir), fields(model = %self.model().display()))]
    async fn run_whisper(
        &self,
        audio_path: &Path,
        output_dir: &Path,
    ) -> Result<String, SpeechError> {
        let output_prefix = output_dir.join(OUTPUT_STEM);

        let mut cmd = Command::new(self.executable());
        cmd.arg("-m")
            .arg(self.model())
            .arg("-f")
            .arg(audio_path)
            .arg("-l")
            .arg(&self.config.language)
            .arg("-t")
            .arg(self.config.threads.to_string())
            .arg("-nt")
            .arg("-otxt")
            .arg("-of")
            .arg(&output_prefix)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Running whisper.cpp: {:?}", cmd);

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpeechError::NotAvailable(format!(
                    "whisper.cpp not found at '{}'. Please install whisper.cpp.",
                    self.executable().display()
                ))
            } else {
                SpeechError::TranscriptionFailed(format!("Failed to run whisper.cpp: {e}"))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("whisper.cpp failed: {}", stderr);
            return Err(SpeechError::TranscriptionFailed(format!(
                "whisper.cpp exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let txt_path = output_prefix.with_extension("txt");
        let text = tokio::fs::read_to_string(&txt_path).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to read transcription output: {e}"))
        })?;

        Ok(normalize_transcript(&text))
    }
}

/// Join whisper.cpp's per-segment lines into a single transcript
fn normalize_transcript(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SpeechToText for WhisperCppProvider {
    #[instrument(
        skip(self, audio),
        fields(format = %audio.format(), audio_size = audio.size_bytes())
    )]
    async fn transcribe(&self, audio: AudioData) -> Result<Transcription, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        if !self.model().exists() {
            return Err(SpeechError::ModelNotAvailable(
                self.model().display().to_string(),
            ));
        }

        let prepared = self.converter.prepare_for_whisper(audio).await?;

        // Both the input copy and whisper's .txt output live here; removed on drop
        let work_dir = tempfile::tempdir().map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to create temp dir: {e}"))
        })?;
        let audio_path = work_dir.path().join(prepared.filename("input"));
        tokio::fs::write(&audio_path, prepared.data())
            .await
            .map_err(|e| {
                SpeechError::TranscriptionFailed(format!("Failed to write temp audio: {e}"))
            })?;

        let text = self.run_whisper(&audio_path, work_dir.path()).await?;

        if text.is_empty() {
            warn!("whisper.cpp returned empty transcription");
        }

        Ok(Transcription::new(text).with_language(self.config.language.clone()))
    }

    async fn is_available(&self) -> bool {
        let executable_exists = self.executable().exists() || {
            Command::new(self.executable())
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|s| s.success())
        };

        let model_exists = self.model().exists();

        debug!(
            "whisper.cpp availability: executable={}, model={}",
            executable_exists, model_exists
        );

        executable_exists && model_exists
    }

    fn model_name(&self) -> &str {
        self.model()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper.cpp")
    }
}
