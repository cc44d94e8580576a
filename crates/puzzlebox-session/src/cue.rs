//! Audio cue control.
//!
//! The room has one narration channel: starting a cue interrupts whatever is
//! playing. [`CueController`] owns the single "current" playback and builds
//! blocking waits on top of the non-blocking [`Playback`] handle by polling
//! it with short sleeps.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use puzzlebox_core::ClipId;
use puzzlebox_core::constants::DEFAULT_CUE_POLL_INTERVAL_MS;
use puzzlebox_hardware::{AudioOutput, Playback};
use tracing::{debug, error, info};

/// Clip identifiers and the files they play.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: HashMap<ClipId, PathBuf>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a clip.
    pub fn insert(&mut self, clip: impl Into<ClipId>, path: impl Into<PathBuf>) {
        self.clips.insert(clip.into(), path.into());
    }

    /// File for `clip`, if known.
    pub fn path(&self, clip: &ClipId) -> Option<&Path> {
        self.clips.get(clip).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ClipLibrary
where
    K: Into<ClipId>,
    V: Into<PathBuf>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut library = Self::new();
        for (clip, path) in iter {
            library.insert(clip, path);
        }
        library
    }
}

/// Plays cues with a single-current-cue policy.
///
/// Playback failures are logged and swallowed: a missing sound must never
/// stop the room.
pub struct CueController<A: AudioOutput> {
    audio: A,
    library: ClipLibrary,
    current: Option<(ClipId, A::Playback)>,
    poll_interval: Duration,
}

impl<A: AudioOutput> CueController<A> {
    pub fn new(audio: A, library: ClipLibrary) -> Self {
        Self {
            audio,
            library,
            current: None,
            poll_interval: Duration::from_millis(DEFAULT_CUE_POLL_INTERVAL_MS),
        }
    }

    /// Set the sub-wait used while waiting for a cue to end.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Stop the current cue and start `clip` without waiting.
    ///
    /// Returns `false` if the clip could not be started.
    pub fn play(&mut self, clip: &ClipId) -> bool {
        self.stop_current();

        let Some(path) = self.library.path(clip) else {
            error!("Unknown clip {}", clip);
            return false;
        };

        match self.audio.play(path) {
            Ok(playback) => {
                info!("Playing {}", clip);
                self.current = Some((clip.clone(), playback));
                true
            }
            Err(e) => {
                error!("Failed to play {}: {}", clip, e);
                false
            }
        }
    }

    /// Stop the current cue, play `clip` and wait until it ends.
    pub async fn play_and_wait(&mut self, clip: &ClipId) {
        if self.play(clip) {
            self.wait_current().await;
        }
    }

    /// Stop the current cue if it is still playing.
    ///
    /// Returns `true` if a playing cue was interrupted.
    pub fn stop_current(&mut self) -> bool {
        let Some((clip, mut playback)) = self.current.take() else {
            return false;
        };
        if playback.is_finished() {
            return false;
        }
        playback.stop();
        debug!("Stopped {}", clip);
        true
    }

    /// Wait until the current cue ends, then forget it.
    pub async fn wait_current(&mut self) {
        while self.is_playing() {
            tokio::time::sleep(self.poll_interval).await;
        }
        self.current = None;
    }

    /// Whether a cue is currently playing.
    pub fn is_playing(&mut self) -> bool {
        self.current
            .as_mut()
            .is_some_and(|(_, playback)| !playback.is_finished())
    }

    /// Clip of the current cue, finished or not.
    pub fn current_clip(&self) -> Option<&ClipId> {
        self.current.as_ref().map(|(clip, _)| clip)
    }

    pub fn library(&self) -> &ClipLibrary {
        &self.library
    }
}

impl<A: AudioOutput> fmt::Debug for CueController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CueController")
            .field("library", &self.library)
            .field("current", &self.current_clip())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
