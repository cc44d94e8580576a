//! Event dispatch: board message → action.

use std::collections::HashSet;

use puzzlebox_core::{Action, FlagName};
use puzzlebox_hardware::AudioOutput;
use puzzlebox_protocol::CodeTable;
use tracing::{debug, info};

use crate::cue::CueController;

/// What a handled message means for the session as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Keep going.
    None,
    /// The room was solved.
    Solved,
}

/// One-shot flags raised during the current session.
#[derive(Debug, Clone, Default)]
pub struct OneShotFlags {
    raised: HashSet<FlagName>,
}

impl OneShotFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `flag`. Returns `false` if it was already raised.
    pub fn raise(&mut self, flag: &FlagName) -> bool {
        self.raised.insert(flag.clone())
    }

    pub fn is_raised(&self, flag: &FlagName) -> bool {
        self.raised.contains(flag)
    }

    /// Lower every flag.
    pub fn clear(&mut self) {
        self.raised.clear();
    }

    pub fn len(&self) -> usize {
        self.raised.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raised.is_empty()
    }
}

/// Looks up board messages and performs the matching action.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: CodeTable,
    flags: OneShotFlags,
}

impl Dispatcher {
    pub fn new(table: CodeTable) -> Self {
        Self {
            table,
            flags: OneShotFlags::new(),
        }
    }

    /// Handle one trimmed message from `device`.
    ///
    /// Actions that wait for a cue return only once the cue has ended; no
    /// other board is serviced meanwhile.
    pub async fn handle<A: AudioOutput>(
        &mut self,
        device: &str,
        message: &str,
        cues: &mut CueController<A>,
    ) -> SessionSignal {
        let Some(action) = self.table.lookup(device, message) else {
            debug!(device, "Ignoring unknown code {:?}", message);
            return SessionSignal::None;
        };

        info!(device, "Code {} -> {}", message, action);

        match action {
            Action::PlayClip { clip } => {
                cues.play(clip);
            }
            Action::PlayClipAndWait { clip } => {
                cues.play_and_wait(clip).await;
            }
            Action::StopCurrent => {
                cues.stop_current();
            }
            Action::MarkOneShotFlagAndPlay { flag, clip } => {
                if self.flags.raise(flag) {
                    cues.play_and_wait(clip).await;
                } else {
                    debug!(device, "One-shot {} already used this session", flag);
                }
            }
            Action::MarkSolved { clip } => {
                cues.play_and_wait(clip).await;
                return SessionSignal::Solved;
            }
        }

        SessionSignal::None
    }

    /// Lower every one-shot flag for a new session.
    pub fn reset_flags(&mut self) {
        self.flags.clear();
    }

    pub fn flags(&self) -> &OneShotFlags {
        &self.flags
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }
}
