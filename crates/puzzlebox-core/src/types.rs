use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of an audio clip in the clip library (e.g. `"lightsound0"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(String);

impl ClipId {
    /// Create a new clip identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the clip identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Name of a one-shot flag (e.g. `"doom2"`).
///
/// A one-shot flag gates an action so that it fires at most once per session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagName(String);

impl FlagName {
    /// Create a new flag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the flag name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FlagName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// What the controller does when a device reports a given code.
///
/// Actions are declared in the deployment configuration, one per code:
///
/// ```toml
/// [codes.default]
/// "10" = { action = "play", clip = "lightsound0" }
/// "19" = { action = "stop" }
/// "5"  = { action = "one_shot", flag = "doom2", clip = "doom2" }
/// "20" = { action = "solved", clip = "gearsound1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Interrupt the current cue and start `clip` without waiting.
    #[serde(rename = "play")]
    PlayClip { clip: ClipId },

    /// Interrupt the current cue, start `clip` and wait for it to finish.
    #[serde(rename = "play_and_wait")]
    PlayClipAndWait { clip: ClipId },

    /// Stop the current cue if it is still playing.
    #[serde(rename = "stop")]
    StopCurrent,

    /// Play `clip` to completion the first time `flag` is seen this session.
    #[serde(rename = "one_shot")]
    MarkOneShotFlagAndPlay { flag: FlagName, clip: ClipId },

    /// Play `clip` to completion, then end the session as solved.
    #[serde(rename = "solved")]
    MarkSolved { clip: ClipId },
}

impl Action {
    /// Get the clip this action plays, if any.
    pub fn clip(&self) -> Option<&ClipId> {
        match self {
            Self::PlayClip { clip }
            | Self::PlayClipAndWait { clip }
            | Self::MarkOneShotFlagAndPlay { clip, .. }
            | Self::MarkSolved { clip } => Some(clip),
            Self::StopCurrent => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::PlayClip { clip } => write!(f, "play {clip}"),
            Self::PlayClipAndWait { clip } => write!(f, "play {clip} and wait"),
            Self::StopCurrent => write!(f, "stop current cue"),
            Self::MarkOneShotFlagAndPlay { flag, clip } => write!(f, "one-shot {flag}: {clip}"),
            Self::MarkSolved { clip } => write!(f, "solved: {clip}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        action: Action,
    }

    fn parse(toml_src: &str) -> Action {
        toml::from_str::<Wrapper>(toml_src).unwrap().action
    }

    #[test]
    fn test_action_deserialize_play() {
        let action = parse(r#"action = { action = "play", clip = "lightsound0" }"#);
        assert_eq!(
            action,
            Action::PlayClip {
                clip: ClipId::new("lightsound0")
            }
        );
    }

    #[test]
    fn test_action_deserialize_stop() {
        let action = parse(r#"action = { action = "stop" }"#);
        assert_eq!(action, Action::StopCurrent);
    }

    #[test]
    fn test_action_deserialize_one_shot() {
        let action = parse(r#"action = { action = "one_shot", flag = "doom2", clip = "doom" }"#);
        assert_eq!(
            action,
            Action::MarkOneShotFlagAndPlay {
                flag: FlagName::new("doom2"),
                clip: ClipId::new("doom"),
            }
        );
    }

    #[test]
    fn test_action_unknown_tag_rejected() {
        let result = toml::from_str::<Wrapper>(r#"action = { action = "explode" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_action_clip() {
        assert_eq!(Action::StopCurrent.clip(), None);
        let solved = Action::MarkSolved {
            clip: ClipId::new("gearsound1"),
        };
        assert_eq!(solved.clip().map(ClipId::as_str), Some("gearsound1"));
    }

    #[test]
    fn test_action_display() {
        let action = Action::MarkOneShotFlagAndPlay {
            flag: FlagName::new("enigma"),
            clip: ClipId::new("enigma_found"),
        };
        assert_eq!(action.to_string(), "one-shot enigma: enigma_found");
    }
}
