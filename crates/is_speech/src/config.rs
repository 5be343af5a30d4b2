//! Configuration for speech processing

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Built-in location of the Icelandic Whisper model (GGML format)
pub const DEFAULT_IS_MODEL_PATH: &str = "~/.local/share/is-speech-cli/models/ggml-whisper-large-icelandic.bin";

/// Environment variable naming the synthesis backend's credentials directory
pub const KEYS_DIR_ENV: &str = "ICESPEAK_KEYS_DIR";

/// Configuration for the HTTP synthesis backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiroConfig {
    /// API base URL (without the `/v0` suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the endpoint requires one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Credentials directory (falls back to `ICESPEAK_KEYS_DIR`)
    #[serde(default)]
    pub keys_dir: Option<PathBuf>,

    /// Synthesis engine requested from the backend
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Sample rate for MP3 output
    #[serde(default = "default_mp3_sample_rate")]
    pub mp3_sample_rate: u32,

    /// Sample rate for raw PCM output, wrapped into WAV
    #[serde(default = "default_pcm_sample_rate")]
    pub pcm_sample_rate: u32,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Longest text accepted in a single request
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

fn default_base_url() -> String {
    "https://tts.tiro.is".to_string()
}

fn default_engine() -> String {
    "standard".to_string()
}

const fn default_mp3_sample_rate() -> u32 {
    22050
}

const fn default_pcm_sample_rate() -> u32 {
    16000
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_max_text_chars() -> usize {
    3000
}

impl Default for TiroConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            keys_dir: None,
            engine: default_engine(),
            mp3_sample_rate: default_mp3_sample_rate(),
            pcm_sample_rate: default_pcm_sample_rate(),
            timeout_ms: default_timeout_ms(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl TiroConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "TTS base URL must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_text_chars == 0 {
            return Err("Maximum text length must be greater than 0".to_string());
        }

        if ![8000, 16000].contains(&self.pcm_sample_rate) {
            return Err(format!(
                "PCM sample rate must be 8000 or 16000, got {}",
                self.pcm_sample_rate
            ));
        }

        if ![8000, 16000, 22050, 24000].contains(&self.mp3_sample_rate) {
            return Err(format!(
                "MP3 sample rate must be one of 8000, 16000, 22050, 24000, got {}",
                self.mp3_sample_rate
            ));
        }

        Ok(())
    }

    /// Credentials directory from the config, or from `ICESPEAK_KEYS_DIR`
    #[must_use]
    pub fn resolved_keys_dir(&self) -> Option<PathBuf> {
        self.keys_dir
            .clone()
            .or_else(|| std::env::var_os(KEYS_DIR_ENV).map(PathBuf::from))
            .map(|dir| expand_home(&dir))
    }
}

/// Configuration for local transcription with whisper.cpp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppConfig {
    /// whisper.cpp executable (name on PATH or absolute path)
    #[serde(default = "default_executable_path")]
    pub executable_path: PathBuf,

    /// GGML model file
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Number of inference threads
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Spoken language passed to the model
    #[serde(default = "default_language")]
    pub language: String,

    /// ffmpeg binary used to convert unsupported formats
    #[serde(default)]
    pub ffmpeg_path: Option<String>,
}

fn default_executable_path() -> PathBuf {
    PathBuf::from("whisper-cli")
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_IS_MODEL_PATH)
}

const fn default_threads() -> u32 {
    4
}

fn default_language() -> String {
    "is".to_string()
}

impl Default for WhisperCppConfig {
    fn default() -> Self {
        Self {
            executable_path: default_executable_path(),
            model_path: default_model_path(),
            threads: default_threads(),
            language: default_language(),
            ffmpeg_path: None,
        }
    }
}

impl WhisperCppConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.executable_path.as_os_str().is_empty() {
            return Err("whisper.cpp executable path must not be empty".to_string());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("Model path must not be empty".to_string());
        }

        if self.threads == 0 {
            return Err("Threads must be greater than 0".to_string());
        }

        if self.language.trim().is_empty() {
            return Err("Language must not be empty".to_string());
        }

        Ok(())
    }
}

/// Expand a leading `~` to the user's home directory
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
