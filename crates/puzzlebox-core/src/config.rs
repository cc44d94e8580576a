//! TOML deployment configuration for a puzzle room.
//!
//! One file describes one physical installation: which boards are plugged
//! into which serial ports, which clip files exist, which code triggers which
//! action, and how long a session lasts. It is loaded once at startup and is
//! immutable afterwards.
//!
//! ```toml
//! config_version = "1"
//!
//! [session]
//! duration_secs = 1200
//! intro = ["intro1", "intro2"]
//! outro = "outro"
//! warnings = [
//!     { remaining_secs = 985, clip = "warn_985" },
//!     { remaining_secs = 128, clip = "warn_128" },
//! ]
//!
//! [devices.engine-room]
//! port = "/dev/ttyACM0"
//!
//! [devices.crypt-gears]   # no port: disabled placeholder
//!
//! [clips]
//! intro1 = "sounds/intro1.wav"
//!
//! [codes.default]
//! "19" = { action = "stop" }
//! ```
//!
//! Fields missing from the file fall back to the defaults in
//! [`constants`](crate::constants). Relative clip paths are resolved against
//! the directory containing the configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CONFIG_VERSION, DEFAULT_BAUD_RATE, DEFAULT_CODE_TABLE, DEFAULT_CUE_POLL_INTERVAL_MS,
    DEFAULT_PLAYER_COMMAND, DEFAULT_SESSION_DURATION_SECS, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_TICK_INTERVAL_MS,
};
use crate::types::{Action, ClipId};

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The session length is zero.
    #[error("session duration must be greater than zero")]
    InvalidDuration,

    /// A clip is referenced but not declared in `[clips]`.
    #[error("{context} references unknown clip '{clip}'")]
    UnknownClip { context: String, clip: ClipId },

    /// A declared clip file does not exist on disk.
    #[error("clip '{clip}' points to missing file {path}")]
    MissingClipFile { clip: ClipId, path: PathBuf },

    /// A code table is named after a device that is not configured.
    #[error("code table '{0}' does not match any configured device")]
    UnknownCodeTable(String),

    /// The player command is empty.
    #[error("audio command must not be empty")]
    EmptyAudioCommand,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level deployment configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PuzzleConfig {
    /// Schema version string, bumped when the code tables change meaning.
    #[serde(default = "default_version")]
    pub config_version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    /// Logical device name → port binding.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceConfig>,
    /// Clip library: clip id → file path.
    #[serde(default)]
    pub clips: BTreeMap<ClipId, PathBuf>,
    /// Code tables: `"default"` or a device name → (code → action).
    #[serde(default)]
    pub codes: BTreeMap<String, BTreeMap<String, Action>>,
}

/// Serial settings shared by every board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Delay after opening a port, while the board resets.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

/// Control loop timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_cue_poll_interval_ms")]
    pub cue_poll_interval_ms: u64,
}

/// Session length, intro/outro clips and time warnings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_session_duration_secs")]
    pub duration_secs: u64,
    /// Clips played back-to-back before the session becomes active.
    #[serde(default)]
    pub intro: Vec<ClipId>,
    /// Clip played when the session times out.
    #[serde(default)]
    pub outro: Option<ClipId>,
    #[serde(default)]
    pub warnings: Vec<WarningConfig>,
}

/// A time warning: play `clip` when `remaining_secs` are left.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarningConfig {
    pub remaining_secs: u64,
    pub clip: ClipId,
}

/// A single board. A missing port disables the device.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default)]
    pub port: Option<String>,
}

/// Which audio backend plays clips.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioBackendKind {
    /// Spawn an external player process per clip.
    #[default]
    Command,
    /// In-process playback (requires the `rodio` feature).
    Rodio,
    /// Log clips without producing sound.
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default)]
    pub backend: AudioBackendKind,
    /// Program and arguments; the clip path is appended as the last argument.
    #[serde(default = "default_player_command")]
    pub command: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}
fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
fn default_cue_poll_interval_ms() -> u64 {
    DEFAULT_CUE_POLL_INTERVAL_MS
}
fn default_session_duration_secs() -> u64 {
    DEFAULT_SESSION_DURATION_SECS
}
fn default_player_command() -> Vec<String> {
    DEFAULT_PLAYER_COMMAND
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            cue_poll_interval_ms: default_cue_poll_interval_ms(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: AudioBackendKind::default(),
            command: default_player_command(),
        }
    }
}

impl SerialConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn cue_poll_interval(&self) -> Duration {
        Duration::from_millis(self.cue_poll_interval_ms)
    }
}

impl SessionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

// ── Loading and validation ────────────────────────────────────────────────────

impl PuzzleConfig {
    /// Load a configuration file and resolve relative clip paths.
    ///
    /// Clip references are validated; clip files are not checked here, use
    /// [`validate`](Self::validate) with `check_files = true` for that.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// references undeclared clips or devices.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_clip_paths(base);
        }
        config.validate(false)?;
        Ok(config)
    }

    /// Parse a configuration from TOML text without validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Make every relative clip path relative to `base`.
    pub fn resolve_clip_paths(&mut self, base: &Path) {
        for path in self.clips.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Check internal consistency, and optionally that every clip file exists.
    ///
    /// A missing clip is a fatal configuration error: clips carry puzzle
    /// state information the players cannot get any other way.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self, check_files: bool) -> Result<(), ConfigError> {
        if self.session.duration_secs == 0 {
            return Err(ConfigError::InvalidDuration);
        }

        if self.audio.backend == AudioBackendKind::Command && self.audio.command.is_empty() {
            return Err(ConfigError::EmptyAudioCommand);
        }

        for (context, clip) in self.clip_references() {
            if !self.clips.contains_key(clip) {
                return Err(ConfigError::UnknownClip {
                    context,
                    clip: clip.clone(),
                });
            }
        }

        for table in self.codes.keys() {
            if table != DEFAULT_CODE_TABLE && !self.devices.contains_key(table) {
                return Err(ConfigError::UnknownCodeTable(table.clone()));
            }
        }

        if check_files {
            for (clip, path) in &self.clips {
                if !path.is_file() {
                    return Err(ConfigError::MissingClipFile {
                        clip: clip.clone(),
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Every clip reference in the file, paired with where it appears.
    pub fn clip_references(&self) -> Vec<(String, &ClipId)> {
        let mut refs = Vec::new();

        for clip in &self.session.intro {
            refs.push(("session.intro".to_string(), clip));
        }
        if let Some(clip) = &self.session.outro {
            refs.push(("session.outro".to_string(), clip));
        }
        for warning in &self.session.warnings {
            refs.push((
                format!("warning at {}s remaining", warning.remaining_secs),
                &warning.clip,
            ));
        }
        for (table, codes) in &self.codes {
            for (code, action) in codes {
                if let Some(clip) = action.clip() {
                    refs.push((format!("code '{code}' in table '{table}'"), clip));
                }
            }
        }

        refs
    }
}
