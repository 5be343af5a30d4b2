//! `--mode` resolution
//!
//! Turns `"save"`, `"play"`, `"play,save"` or the legacy `"both"` into a set
//! of post-synthesis actions.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CliError;

/// A single post-synthesis action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// Write the audio to disk
    Save,
    /// Play the audio through the OS player
    Play,
}

impl Mode {
    /// Token used on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Play => "play",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty set of requested actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSet(BTreeSet<Mode>);

impl ModeSet {
    /// Resolve a mode string
    ///
    /// Tokens are comma-separated, trimmed and lower-cased; empty tokens are
    /// skipped. `both` expands to `save` and `play`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidMode` for an unknown token or when nothing
    /// remains after resolution.
    pub fn resolve(raw: &str) -> Result<Self, CliError> {
        let mut modes = BTreeSet::new();

        for token in raw.split(',') {
            match token.trim().to_lowercase().as_str() {
                "" => {},
                "save" => {
                    modes.insert(Mode::Save);
                },
                "play" => {
                    modes.insert(Mode::Play);
                },
                "both" => {
                    modes.insert(Mode::Save);
                    modes.insert(Mode::Play);
                },
                _ => return Err(CliError::InvalidMode(raw.to_string())),
            }
        }

        if modes.is_empty() {
            return Err(CliError::InvalidMode(raw.to_string()));
        }

        Ok(Self(modes))
    }

    /// Whether `mode` was requested
    #[must_use]
    pub fn contains(&self, mode: Mode) -> bool {
        self.0.contains(&mode)
    }

    /// Whether saving was requested
    #[must_use]
    pub fn save(&self) -> bool {
        self.contains(Mode::Save)
    }

    /// Whether playback was requested
    #[must_use]
    pub fn play(&self) -> bool {
        self.contains(Mode::Play)
    }

    /// Iterate the requested modes in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ModeSet {
    fn default() -> Self {
        Self(BTreeSet::from([Mode::Save]))
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl FromStr for ModeSet {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}
