//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, Transcription, Voice};

/// Port for Speech-to-Text (STT) implementations
///
/// Implementations of this trait convert audio data to text transcriptions.
///
/// # Example
///
/// ```ignore
/// use is_speech::{AudioData, AudioFormat, SpeechToText};
///
/// async fn transcribe_memo(
///     stt: &dyn SpeechToText,
///     audio: AudioData,
/// ) -> Result<String, SpeechError> {
///     let transcription = stt.transcribe(audio).await?;
///     Ok(transcription.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::UnsupportedFormat` if the audio cannot be fed to
    /// the model, or another `SpeechError` if transcription fails.
    async fn transcribe(&self, audio: AudioData) -> Result<Transcription, SpeechError>;

    /// Check if the STT backend is installed and its model is present
    async fn is_available(&self) -> bool;

    /// Get the name of the current STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
///
/// Implementations of this trait convert text to audio speech.
///
/// # Example
///
/// ```ignore
/// use is_speech::{AudioFormat, TextToSpeech, Voice};
///
/// async fn greet(tts: &dyn TextToSpeech) -> Result<Vec<u8>, SpeechError> {
///     let audio = tts.synthesize("Halló heimur", Voice::Dora, AudioFormat::Mp3).await?;
///     Ok(audio.data().to_vec())
/// }
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech in the requested format
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails or the format is not supported.
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        format: AudioFormat,
    ) -> Result<AudioData, SpeechError>;

    /// Check if the TTS service is reachable
    async fn is_available(&self) -> bool;

    /// Get the name of the backend serving the voices
    fn name(&self) -> &str;
}
