//! Audio playback through an OS player executable
//!
//! Playback never aborts a run: a missing or failing player is reported as a
//! warning and the caller carries on.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use is_speech::AudioFormat;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Non-fatal notice that audio could not be played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("playback unavailable: {reason}; skipping play")]
pub struct PlaybackUnavailableWarning {
    /// Why nothing was played
    pub reason: String,
}

/// What happened when playback was attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// A player ran to completion
    Played { player: String },
    /// No usable player was found
    Unavailable(PlaybackUnavailableWarning),
    /// The player could not be started or exited unsuccessfully
    Failed { player: String, reason: String },
}

impl PlaybackOutcome {
    /// Warning to show the user, if any
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Played { .. } => None,
            Self::Unavailable(warning) => Some(warning.to_string()),
            Self::Failed { player, reason } => {
                Some(format!("playback with {player} failed: {reason}"))
            },
        }
    }

    /// Whether audio was actually played
    #[must_use]
    pub const fn is_played(&self) -> bool {
        matches!(self, Self::Played { .. })
    }
}

/// Port for playing an audio file
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play `path` (encoded as `format`) to completion
    async fn play(&self, path: &Path, format: AudioFormat) -> PlaybackOutcome;
}

/// A known player program and the formats it handles
#[derive(Debug, Clone, Copy)]
struct PlayerCommand {
    program: &'static str,
    args: &'static [&'static str],
    formats: Option<&'static [AudioFormat]>,
}

impl PlayerCommand {
    fn supports(&self, format: AudioFormat) -> bool {
        self.formats.is_none_or(|formats| formats.contains(&format))
    }
}

const AFPLAY: PlayerCommand = PlayerCommand {
    program: "afplay",
    args: &[],
    formats: None,
};

const PAPLAY: PlayerCommand = PlayerCommand {
    program: "paplay",
    args: &[],
    formats: Some(&[AudioFormat::Wav, AudioFormat::Flac, AudioFormat::Ogg]),
};

const APLAY: PlayerCommand = PlayerCommand {
    program: "aplay",
    args: &["-q"],
    formats: Some(&[AudioFormat::Wav]),
};

const FFPLAY: PlayerCommand = PlayerCommand {
    program: "ffplay",
    args: &["-nodisp", "-autoexit", "-loglevel", "quiet"],
    formats: None,
};

const MPG123: PlayerCommand = PlayerCommand {
    program: "mpg123",
    args: &["-q"],
    formats: Some(&[AudioFormat::Mp3]),
};

/// Every player this module knows how to drive
const KNOWN_PLAYERS: &[PlayerCommand] = &[AFPLAY, PAPLAY, APLAY, FFPLAY, MPG123];

/// Players tried in order on this platform
const PLATFORM_PLAYERS: &[PlayerCommand] = if cfg!(target_os = "macos") {
    &[AFPLAY, FFPLAY]
} else {
    &[PAPLAY, APLAY, FFPLAY, MPG123]
};

/// Plays audio with the first suitable player found on `PATH`
#[derive(Debug, Clone, Default)]
pub struct SystemPlayer {
    /// Player program chosen by the user, tried instead of the defaults
    preferred: Option<String>,
    /// Directories to search instead of `PATH`
    search_path: Option<OsString>,
}

impl SystemPlayer {
    /// Player using the platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Player restricted to a user-chosen program
    #[must_use]
    pub fn with_preferred(mut self, program: Option<String>) -> Self {
        self.preferred = program.filter(|p| !p.trim().is_empty());
        self
    }

    /// Search these directories instead of `PATH`
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Locate a program, either as a path or by name on the search path
    fn find_executable(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }

        let search_path = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))?;

        std::env::split_paths(&search_path)
            .map(|dir| dir.join(program))
            .find(|path| path.is_file())
    }

    /// First available player able to handle `format`
    fn select(&self, format: AudioFormat) -> Result<(PathBuf, &'static [&'static str]), String> {
        if let Some(program) = &self.preferred {
            let name = Path::new(program).file_name().and_then(|n| n.to_str());
            let args = KNOWN_PLAYERS
                .iter()
                .find(|known| name == Some(known.program))
                .map_or(&[][..], |known| known.args);

            return self
                .find_executable(program)
                .map(|path| (path, args))
                .ok_or_else(|| format!("configured player '{program}' was not found"));
        }

        PLATFORM_PLAYERS
            .iter()
            .filter(|player| player.supports(format))
            .find_map(|player| {
                self.find_executable(player.program)
                    .map(|path| (path, player.args))
            })
            .ok_or_else(|| {
                let names: Vec<_> = PLATFORM_PLAYERS
                    .iter()
                    .filter(|player| player.supports(format))
                    .map(|player| player.program)
                    .collect();
                format!("no audio player for {format} found (looked for {})", names.join(", "))
            })
    }
}

#[async_trait]
impl AudioPlayer for SystemPlayer {
    #[instrument(skip(self), fields(path = %path.display(), format = %format))]
    async fn play(&self, path: &Path, format: AudioFormat) -> PlaybackOutcome {
        let (executable, args) = match self.select(format) {
            Ok(found) => found,
            Err(reason) => {
                debug!("{}", reason);
                return PlaybackOutcome::Unavailable(PlaybackUnavailableWarning { reason });
            },
        };

        let player = executable.display().to_string();
        debug!("Playing with {}", player);

        let output = Command::new(&executable)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => PlaybackOutcome::Played { player },
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = format!("exited with {}: {}", output.status, stderr.trim());
                debug!("Player {} {}", player, reason);
                PlaybackOutcome::Failed { player, reason }
            },
            Err(e) => {
                debug!("Failed to start player {}: {}", player, e);
                PlaybackOutcome::Failed {
                    player,
                    reason: e.to_string(),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_messages() {
        let unavailable = PlaybackOutcome::Unavailable(PlaybackUnavailableWarning {
            reason: "no audio player for mp3 found".to_string(),
        });
        assert_eq!(
            unavailable.warning().as_deref(),
            Some("playback unavailable: no audio player for mp3 found; skipping play")
        );

        let played = PlaybackOutcome::Played {
            player: "afplay".to_string(),
        };
        assert!(played.warning().is_none());
        assert!(played.is_played());
    }

    #[test]
    fn player_format_support() {
        assert!(APLAY.supports(AudioFormat::Wav));
        assert!(!APLAY.supports(AudioFormat::Mp3));
        assert!(MPG123.supports(AudioFormat::Mp3));
        assert!(FFPLAY.supports(AudioFormat::M4a));
    }

    #[tokio::test]
    async fn empty_search_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let player = SystemPlayer::new().with_search_path(dir.path());

        let outcome = player.play(Path::new("/tmp/out.mp3"), AudioFormat::Mp3).await;

        assert!(matches!(outcome, PlaybackOutcome::Unavailable(_)));
        assert!(outcome.warning().is_some());
    }

    #[tokio::test]
    async fn missing_preferred_player_is_unavailable() {
        let player = SystemPlayer::new()
            .with_preferred(Some("/nonexistent/bin/afplay".to_string()));

        let outcome = player.play(Path::new("/tmp/out.wav"), AudioFormat::Wav).await;

        match outcome {
            PlaybackOutcome::Unavailable(warning) => {
                assert!(warning.reason.contains("/nonexistent/bin/afplay"));
            },
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn blank_preferred_player_is_ignored() {
        let player = SystemPlayer::new().with_preferred(Some("  ".to_string()));
        assert!(player.preferred.is_none());
    }

    #[cfg(unix)]
    mod unix {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        fn fake_player(dir: &Path, name: &str, body: &str) {
            let script = dir.join(name);
            std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        #[tokio::test]
        async fn plays_with_first_supported_player() {
            let dir = tempfile::tempdir().unwrap();
            fake_player(dir.path(), "ffplay", "exit 0");
            fake_player(dir.path(), "afplay", "exit 0");
            let player = SystemPlayer::new().with_search_path(dir.path());

            let outcome = player.play(Path::new("/tmp/out.mp3"), AudioFormat::Mp3).await;

            assert!(outcome.is_played(), "{outcome:?}");
        }

        #[tokio::test]
        async fn failing_player_is_reported_not_fatal() {
            let dir = tempfile::tempdir().unwrap();
            fake_player(dir.path(), "ffplay", "echo 'no device' >&2\nexit 1");
            let player = SystemPlayer::new().with_search_path(dir.path());

            let outcome = player.play(Path::new("/tmp/out.mp3"), AudioFormat::Mp3).await;

            match outcome {
                PlaybackOutcome::Failed { reason, .. } => assert!(reason.contains("no device")),
                other => panic!("expected Failed, got {other:?}"),
            }
        }
    }
}
