//! Icelandic speech - Speech-to-Text and Text-to-Speech abstractions
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - Transcribe audio to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - `TiroSpeechProvider` - Icelandic cloud voices (Dora, Karl) over HTTP
//! - `WhisperCppProvider` - Local whisper.cpp with an Icelandic model
//!
//! # Example
//!
//! ```ignore
//! use is_speech::{AudioFormat, TextToSpeech, TiroConfig, TiroSpeechProvider, Voice};
//!
//! let provider = TiroSpeechProvider::new(TiroConfig::default())?;
//! let audio = provider.synthesize("Halló heimur", Voice::Dora, AudioFormat::Mp3).await?;
//! std::fs::write(audio.filename("greeting"), audio.data())?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{DEFAULT_IS_MODEL_PATH, TiroConfig, WhisperCppConfig, expand_home};
pub use converter::AudioConverter;
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{TiroSpeechProvider, WhisperCppProvider};
pub use types::{AudioData, AudioFormat, Transcription, Voice};
