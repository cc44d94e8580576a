//! Mock audio output for testing and development.
//!
//! Clips "play" for a configurable duration measured on the tokio clock, so
//! tests running with paused time can fast-forward through long cues.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::traits::{AudioOutput, Playback};
use crate::{HardwareError, Result};

/// Clip length used when no duration was set for a path.
const DEFAULT_CLIP_DURATION: Duration = Duration::from_secs(1);

/// Something that happened on the mock output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// A clip started.
    Started(PathBuf),
    /// A clip was stopped before reaching its end.
    Stopped(PathBuf),
}

/// An [`AudioEvent`] with the instant it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRecord {
    pub event: AudioEvent,
    pub at: Instant,
}

#[derive(Debug)]
struct MockAudioState {
    durations: HashMap<PathBuf, Duration>,
    default_duration: Duration,
    failing: HashSet<PathBuf>,
    records: Vec<AudioRecord>,
}

impl MockAudioState {
    fn record(&mut self, event: AudioEvent) {
        self.records.push(AudioRecord {
            event,
            at: Instant::now(),
        });
    }
}

fn lock(state: &Mutex<MockAudioState>) -> MutexGuard<'_, MockAudioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock audio output recording every start and stop.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use puzzlebox_hardware::mock::{AudioEvent, MockAudio};
/// use puzzlebox_hardware::traits::{AudioOutput, Playback};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut audio, handle) = MockAudio::new();
/// let mut playback = audio.play(Path::new("gearsound1.wav")).unwrap();
/// playback.stop();
///
/// assert_eq!(
///     handle.events(),
///     vec![
///         AudioEvent::Started("gearsound1.wav".into()),
///         AudioEvent::Stopped("gearsound1.wav".into()),
///     ]
/// );
/// # }
/// ```
#[derive(Debug)]
pub struct MockAudio {
    state: Arc<Mutex<MockAudioState>>,
}

impl MockAudio {
    /// Create a new mock output and its controlling handle.
    pub fn new() -> (Self, MockAudioHandle) {
        let state = Arc::new(Mutex::new(MockAudioState {
            durations: HashMap::new(),
            default_duration: DEFAULT_CLIP_DURATION,
            failing: HashSet::new(),
            records: Vec::new(),
        }));

        (
            Self {
                state: Arc::clone(&state),
            },
            MockAudioHandle { state },
        )
    }
}

impl AudioOutput for MockAudio {
    type Playback = MockPlayback;

    fn play(&mut self, path: &Path) -> Result<MockPlayback> {
        let mut state = lock(&self.state);

        if state.failing.contains(path) {
            return Err(HardwareError::audio(format!(
                "cannot play {}",
                path.display()
            )));
        }

        let duration = state
            .durations
            .get(path)
            .copied()
            .unwrap_or(state.default_duration);
        state.record(AudioEvent::Started(path.to_path_buf()));

        Ok(MockPlayback {
            path: path.to_path_buf(),
            ends_at: Instant::now() + duration,
            stopped: false,
            state: Arc::clone(&self.state),
        })
    }
}

/// Playback handle returned by [`MockAudio`].
#[derive(Debug)]
pub struct MockPlayback {
    path: PathBuf,
    ends_at: Instant,
    stopped: bool,
    state: Arc<Mutex<MockAudioState>>,
}

impl Playback for MockPlayback {
    fn stop(&mut self) {
        if self.is_finished() {
            return;
        }
        self.stopped = true;
        lock(&self.state).record(AudioEvent::Stopped(self.path.clone()));
    }

    fn is_finished(&mut self) -> bool {
        self.stopped || Instant::now() >= self.ends_at
    }
}

/// Handle for configuring and inspecting a [`MockAudio`].
#[derive(Debug, Clone)]
pub struct MockAudioHandle {
    state: Arc<Mutex<MockAudioState>>,
}

impl MockAudioHandle {
    /// Set how long the clip at `path` plays.
    pub fn set_duration(&self, path: impl Into<PathBuf>, duration: Duration) {
        lock(&self.state).durations.insert(path.into(), duration);
    }

    /// Set the length of clips without an explicit duration.
    pub fn set_default_duration(&self, duration: Duration) {
        lock(&self.state).default_duration = duration;
    }

    /// Make every attempt to play `path` fail.
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        lock(&self.state).failing.insert(path.into());
    }

    /// All recorded events with timestamps.
    pub fn records(&self) -> Vec<AudioRecord> {
        lock(&self.state).records.clone()
    }

    /// All recorded events in order.
    pub fn events(&self) -> Vec<AudioEvent> {
        lock(&self.state)
            .records
            .iter()
            .map(|r| r.event.clone())
            .collect()
    }

    /// Paths of every started clip in order.
    pub fn started(&self) -> Vec<PathBuf> {
        lock(&self.state)
            .records
            .iter()
            .filter_map(|r| match &r.event {
                AudioEvent::Started(path) => Some(path.clone()),
                AudioEvent::Stopped(_) => None,
            })
            .collect()
    }

    /// Paths of every stopped clip in order.
    pub fn stopped(&self) -> Vec<PathBuf> {
        lock(&self.state)
            .records
            .iter()
            .filter_map(|r| match &r.event {
                AudioEvent::Stopped(path) => Some(path.clone()),
                AudioEvent::Started(_) => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.state).records.clear();
    }
}
