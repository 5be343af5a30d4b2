//! is-speech CLI
//!
//! Command parsing, settings and handlers behind the `is-speech` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod input;
pub mod mode;
pub mod playback;
pub mod settings;

pub use cli::{Cli, Commands, SttArgs, TtsArgs, log_filter_from_verbosity};
pub use commands::{SttRequest, TtsOutcome, TtsRequest, run_stt, run_tts};
pub use error::CliError;
pub use input::{read_piped_stdin, resolve_text, resolve_tts_text};
pub use mode::{Mode, ModeSet};
pub use playback::{AudioPlayer, PlaybackOutcome, PlaybackUnavailableWarning, SystemPlayer};
pub use settings::Settings;
