//! Speech processing errors

use thiserror::Error;

/// Errors raised by the speech ports and their providers
#[derive(Debug, Error)]
pub enum SpeechError {
    // Transport
    /// The synthesis service could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP exchange failed after connecting
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// No answer within the configured timeout
    #[error("Speech service did not answer within {0}ms")]
    Timeout(u64),

    /// HTTP 429 from the synthesis service
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The service answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Synthesis
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// The service does not know the requested voice
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    // Recognition
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// The whisper model file is missing
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// A required executable is not installed
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    // Audio
    /// Empty or corrupt input audio
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// The recognition model cannot read this audio and it cannot be converted
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// ffmpeg or WAV encoding failed
    #[error("Audio processing failed: {0}")]
    AudioProcessing(String),

    /// Rejected provider settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Connect failures and other transport errors; timeouts are mapped by the
/// provider, which knows its configured limit
impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_detail() {
        let cases = [
            (
                SpeechError::ConnectionFailed("refused".to_string()),
                "Connection failed: refused",
            ),
            (
                SpeechError::UnsupportedFormat("m4a (ffmpeg not found)".to_string()),
                "Unsupported audio format: m4a (ffmpeg not found)",
            ),
            (
                SpeechError::SynthesisFailed("empty text".to_string()),
                "Synthesis failed: empty text",
            ),
            (
                SpeechError::ModelNotAvailable("/models/ggml-is.bin".to_string()),
                "Model not available: /models/ggml-is.bin",
            ),
            (
                SpeechError::VoiceNotFound("Gudrun".to_string()),
                "Voice not found: Gudrun",
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn timeout_reports_limit() {
        assert_eq!(
            SpeechError::Timeout(30000).to_string(),
            "Speech service did not answer within 30000ms"
        );
    }

    #[test]
    fn rate_limited_message() {
        assert_eq!(SpeechError::RateLimited.to_string(), "Rate limit exceeded");
    }
}
