//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech` traits.

pub mod tiro;
pub mod whisper_cpp;

pub use tiro::TiroSpeechProvider;
pub use whisper_cpp::WhisperCppProvider;
