//! Layered settings: defaults, optional TOML file, then environment
//!
//! Environment variables use the `IS_SPEECH_CLI_` prefix; nested keys are
//! separated by `__`, e.g. `IS_SPEECH_CLI_TTS__BASE_URL`. The model-path
//! fallback is the flat `IS_SPEECH_CLI_IS_MODEL_PATH`.

use std::path::{Path, PathBuf};

use is_speech::{TiroConfig, WhisperCppConfig, expand_home};
use serde::Deserialize;

/// Prefix of all environment overrides
pub const ENV_PREFIX: &str = "IS_SPEECH_CLI";

/// Environment variable holding the model path fallback
pub const MODEL_PATH_ENV: &str = "IS_SPEECH_CLI_IS_MODEL_PATH";

/// Resolved settings for one run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Model path override (normally from `IS_SPEECH_CLI_IS_MODEL_PATH`)
    #[serde(default)]
    pub is_model_path: Option<PathBuf>,

    /// Preferred audio player program
    #[serde(default)]
    pub player: Option<String>,

    /// Synthesis backend
    #[serde(default)]
    pub tts: TiroConfig,

    /// Recognition backend
    #[serde(default)]
    pub stt: WhisperCppConfig,
}

impl Settings {
    /// Load settings from an explicit file (must exist) or the default
    /// per-user file (optional), then the process environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match config_file {
            Some(path) => Some((path.to_path_buf(), true)),
            None => default_config_file().map(|path| (path, false)),
        };

        Self::build(file, None)
    }

    /// Assemble the layers; `env` replaces the process environment when given
    pub(crate) fn build(
        file: Option<(PathBuf, bool)>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some((path, required)) = file {
            builder = builder.add_source(config::File::from(path).required(required));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Model path: flag, then `IS_SPEECH_CLI_IS_MODEL_PATH`, then the
    /// configured `stt.model_path` (which defaults to the built-in path)
    #[must_use]
    pub fn resolve_model_path(&self, flag: Option<&Path>) -> PathBuf {
        let chosen = flag
            .map(Path::to_path_buf)
            .or_else(|| self.is_model_path.clone())
            .unwrap_or_else(|| self.stt.model_path.clone());

        expand_home(&chosen)
    }

    /// Recognition config with the model path resolved against `flag`
    #[must_use]
    pub fn whisper_config(&self, flag: Option<&Path>) -> WhisperCppConfig {
        WhisperCppConfig {
            model_path: self.resolve_model_path(flag),
            ..self.stt.clone()
        }
    }
}

/// `<config_dir>/is-speech-cli/config.toml`
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("is-speech-cli").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use is_speech::DEFAULT_IS_MODEL_PATH;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_without_file_or_env() {
        let settings = Settings::build(None, env(&[])).unwrap();

        assert!(settings.is_model_path.is_none());
        assert!(settings.player.is_none());
        assert_eq!(settings.tts.base_url, "https://tts.tiro.is");
        assert_eq!(settings.stt.language, "is");
        assert_eq!(
            settings.resolve_model_path(None),
            expand_home(Path::new(DEFAULT_IS_MODEL_PATH))
        );
    }

    #[test]
    fn model_path_env_fallback() {
        let settings =
            Settings::build(None, env(&[(MODEL_PATH_ENV, "/models/from-env.bin")])).unwrap();

        assert_eq!(
            settings.resolve_model_path(None),
            PathBuf::from("/models/from-env.bin")
        );
    }

    #[test]
    fn model_path_flag_beats_env() {
        let settings =
            Settings::build(None, env(&[(MODEL_PATH_ENV, "/models/from-env.bin")])).unwrap();

        assert_eq!(
            settings.resolve_model_path(Some(Path::new("/models/from-flag.bin"))),
            PathBuf::from("/models/from-flag.bin")
        );
    }

    #[test]
    fn env_beats_file_and_file_beats_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
player = "ffplay"

[tts]
base_url = "http://localhost:8080"

[stt]
model_path = "/models/from-file.bin"
threads = 2
"#,
        )
        .unwrap();

        let from_file = Settings::build(Some((file.clone(), true)), env(&[])).unwrap();
        assert_eq!(
            from_file.resolve_model_path(None),
            PathBuf::from("/models/from-file.bin")
        );
        assert_eq!(from_file.player.as_deref(), Some("ffplay"));
        assert_eq!(from_file.tts.base_url, "http://localhost:8080");
        assert_eq!(from_file.stt.threads, 2);

        let with_env = Settings::build(
            Some((file, true)),
            env(&[
                (MODEL_PATH_ENV, "/models/from-env.bin"),
                ("IS_SPEECH_CLI_STT__THREADS", "6"),
                ("IS_SPEECH_CLI_TTS__BASE_URL", "http://tts.internal"),
            ]),
        )
        .unwrap();
        assert_eq!(
            with_env.resolve_model_path(None),
            PathBuf::from("/models/from-env.bin")
        );
        assert_eq!(with_env.stt.threads, 6);
        assert_eq!(with_env.tts.base_url, "http://tts.internal");
    }

    #[test]
    fn missing_optional_file_is_fine() {
        let settings = Settings::build(
            Some((PathBuf::from("/nonexistent/is-speech/config.toml"), false)),
            env(&[]),
        )
        .unwrap();
        assert_eq!(settings.stt.threads, 4);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Settings::build(
            Some((PathBuf::from("/nonexistent/is-speech/config.toml"), true)),
            env(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn whisper_config_carries_resolved_model() {
        let settings = Settings::default();
        let config = settings.whisper_config(Some(Path::new("/models/x.bin")));

        assert_eq!(config.model_path, PathBuf::from("/models/x.bin"));
        assert_eq!(config.language, "is");
    }
}
