//! Icelandic Text-to-Speech over HTTP
//!
//! Implements `TextToSpeech` against a Polly-shaped speech API such as the
//! one served by `tts.tiro.is`, which fronts the Icelandic cloud voices
//! (Dóra and Karl).
//!
//! # Output formats
//!
//! - `mp3` is requested directly
//! - `wav` is requested as raw 16-bit PCM and wrapped in a RIFF container

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::TiroConfig;
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::{AudioData, AudioFormat, Voice};

/// File holding the bearer token inside the credentials directory
pub const KEY_FILENAME: &str = "TiroTTSKey.txt";

/// HTTP speech synthesis provider
#[derive(Debug, Clone)]
pub struct TiroSpeechProvider {
    client: Client,
    config: TiroConfig,
    api_key: Option<String>,
}

impl TiroSpeechProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: TiroConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let api_key = config.api_key.clone().or_else(|| {
            config
                .resolved_keys_dir()
                .and_then(|dir| read_key_file(&dir.join(KEY_FILENAME)))
        });

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Build the synthesis endpoint URL
    fn speech_url(&self) -> String {
        format!("{}/v0/speech", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the voice listing endpoint URL
    fn voices_url(&self) -> String {
        format!("{}/v0/voices", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Wire format and sample rate for a requested output format
    fn wire_format(&self, format: AudioFormat) -> Result<(&'static str, u32), SpeechError> {
        match format {
            AudioFormat::Mp3 => Ok(("mp3", self.config.mp3_sample_rate)),
            AudioFormat::Wav => Ok(("pcm", self.config.pcm_sample_rate)),
            other => Err(SpeechError::SynthesisFailed(format!(
                "Output format {other} is not supported (use mp3 or wav)"
            ))),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> SpeechError {
        if err.is_timeout() {
            SpeechError::Timeout(self.config.timeout_ms)
        } else {
            SpeechError::from(err)
        }
    }

    fn map_error_status(status: StatusCode, body: &str, voice: Voice) -> SpeechError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited,
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND
                if body.to_ascii_lowercase().contains("voice") =>
            {
                SpeechError::VoiceNotFound(voice.id().to_string())
            },
            _ => SpeechError::SynthesisFailed(format!("HTTP {status}: {}", body.trim())),
        }
    }
}

/// Read the first non-empty line of a key file
fn read_key_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let key = contents.lines().map(str::trim).find(|l| !l.is_empty())?;
    debug!("Loaded TTS credentials from {}", path.display());
    Some(key.to_string())
}

/// Wrap little-endian 16-bit mono PCM in a WAV container
fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, SpeechError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| SpeechError::AudioProcessing(format!("Failed to start WAV: {e}")))?;

    for frame in pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to write WAV: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| SpeechError::AudioProcessing(format!("Failed to finish WAV: {e}")))?;

    Ok(cursor.into_inner())
}

/// Speech synthesis request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechRequest<'a> {
    engine: &'a str,
    language_code: &'a str,
    output_format: &'a str,
    sample_rate: String,
    text: &'a str,
    text_type: &'a str,
    voice_id: &'a str,
}

#[async_trait]
impl TextToSpeech for TiroSpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = %voice, format = %format))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        format: AudioFormat,
    ) -> Result<AudioData, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let chars = text.chars().count();
        if chars > self.config.max_text_chars {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {chars} characters exceeds {} limit",
                self.config.max_text_chars
            )));
        }

        let (output_format, sample_rate) = self.wire_format(format)?;

        let request = SpeechRequest {
            engine: &self.config.engine,
            language_code: voice.language_code(),
            output_format,
            sample_rate: sample_rate.to_string(),
            text,
            text_type: "text",
            voice_id: voice.id(),
        };

        debug!("Requesting speech synthesis");

        let response = self
            .authorize(self.client.post(self.speech_url()))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, &error_body, voice));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    SpeechError::InvalidResponse(format!("Failed to read audio: {e}"))
                }
            })?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "Backend returned no audio".to_string(),
            ));
        }

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        let data = match format {
            AudioFormat::Wav => pcm_to_wav(&audio_bytes, sample_rate)?,
            _ => audio_bytes.to_vec(),
        };

        Ok(AudioData::new(data, format).with_sample_rate(sample_rate))
    }

    async fn is_available(&self) -> bool {
        match self
            .authorize(self.client.get(self.voices_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("TTS availability check failed: {}", e);
                false
            },
        }
    }

    fn name(&self) -> &str {
        "tiro"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_provider(mock_server: &MockServer) -> TiroSpeechProvider {
        let config = TiroConfig {
            base_url: mock_server.uri(),
            api_key: Some("test-api-key".to_string()),
            ..Default::default()
        };
        TiroSpeechProvider::new(config).unwrap()
    }

    #[test]
    fn urls_tolerate_trailing_slash() {
        let config = TiroConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let provider = TiroSpeechProvider::new(config).unwrap();
        assert_eq!(provider.speech_url(), "http://localhost:9000/v0/speech");
        assert_eq!(provider.voices_url(), "http://localhost:9000/v0/voices");
    }

    #[test]
    fn rejects_invalid_config() {
        let config = TiroConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = TiroSpeechProvider::new(config).unwrap_err();
        assert!(matches!(err, SpeechError::Configuration(_)));
    }

    #[test]
    fn reads_key_from_keys_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(KEY_FILENAME), "\n  secret-token \n").unwrap();

        let config = TiroConfig {
            keys_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let provider = TiroSpeechProvider::new(config).unwrap();
        assert_eq!(provider.api_key.as_deref(), Some("secret-token"));
    }

    #[test]
    fn pcm_is_wrapped_in_wav_header() {
        let pcm: Vec<u8> = [0_i16, 1000, -1000, 32000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        let wav = pcm_to_wav(&pcm, 16000).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.into_samples().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0, 1000, -1000, 32000]);
    }

    #[test]
    fn error_status_mapping() {
        assert!(matches!(
            TiroSpeechProvider::map_error_status(StatusCode::TOO_MANY_REQUESTS, "", Voice::Dora),
            SpeechError::RateLimited
        ));
        assert!(matches!(
            TiroSpeechProvider::map_error_status(
                StatusCode::BAD_REQUEST,
                "Unknown VoiceId",
                Voice::Karl
            ),
            SpeechError::VoiceNotFound(v) if v == "Karl"
        ));
        assert!(matches!(
            TiroSpeechProvider::map_error_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "boom",
                Voice::Dora
            ),
            SpeechError::SynthesisFailed(_)
        ));
    }

    #[tokio::test]
    async fn synthesize_mp3_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0/speech"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "VoiceId": "Dora",
                "OutputFormat": "mp3",
                "LanguageCode": "is-IS",
                "TextType": "text",
                "Text": "Halló heimur"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00])
                    .insert_header("content-type", "audio/mpeg"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let audio = provider
            .synthesize("Halló heimur", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap();

        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert_eq!(audio.data(), &[0xFF, 0xFB, 0x90, 0x00]);
    }

    #[tokio::test]
    async fn synthesize_wav_requests_pcm() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0/speech"))
            .and(body_partial_json(serde_json::json!({
                "VoiceId": "Karl",
                "OutputFormat": "pcm",
                "SampleRate": "16000"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0, 0, 1, 0]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let audio = provider
            .synthesize("Góðan dag", Voice::Karl, AudioFormat::Wav)
            .await
            .unwrap();

        assert_eq!(audio.format(), AudioFormat::Wav);
        assert_eq!(audio.sample_rate(), Some(16000));
        assert_eq!(&audio.data()[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn synthesize_rejects_empty_text() {
        let mock_server = MockServer::start().await;
        let provider = create_test_provider(&mock_server);

        let err = provider
            .synthesize("   ", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::SynthesisFailed(_)));
    }

    #[tokio::test]
    async fn synthesize_rejects_text_over_limit() {
        let mock_server = MockServer::start().await;
        let config = TiroConfig {
            base_url: mock_server.uri(),
            max_text_chars: 5,
            ..Default::default()
        };
        let provider = TiroSpeechProvider::new(config).unwrap();

        let err = provider
            .synthesize("Þetta er of langt", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Text too long"));
    }

    #[tokio::test]
    async fn synthesize_rejects_unsupported_format() {
        let mock_server = MockServer::start().await;
        let provider = create_test_provider(&mock_server);

        let err = provider
            .synthesize("Halló", Voice::Dora, AudioFormat::Flac)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::SynthesisFailed(_)));
    }

    #[tokio::test]
    async fn synthesize_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0/speech"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let err = provider
            .synthesize("Halló", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::RateLimited));
    }

    #[tokio::test]
    async fn synthesize_empty_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0/speech"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        let err = provider
            .synthesize("Halló", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_backend_times_out_with_configured_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v0/speech"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![1_u8; 16])
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let provider = TiroSpeechProvider::new(TiroConfig {
            base_url: mock_server.uri(),
            timeout_ms: 50,
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .synthesize("Halló", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Timeout(50)));
    }

    #[tokio::test]
    async fn stalled_audio_body_times_out_with_configured_limit() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0_u8; 4096];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nabc")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let provider = TiroSpeechProvider::new(TiroConfig {
            base_url: format!("http://{addr}"),
            timeout_ms: 200,
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .synthesize("Halló", Voice::Dora, AudioFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Timeout(200)), "{err:?}");
    }

    #[tokio::test]
    async fn is_available_checks_voices_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v0/voices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        assert!(provider.is_available().await);
        assert_eq!(provider.name(), "tiro");
    }

    #[tokio::test]
    async fn is_available_false_on_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v0/voices"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server);
        assert!(!provider.is_available().await);
    }
}
