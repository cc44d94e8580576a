//! Session phase state machine.
//!
//! # Phases
//!
//! - `Idle`: waiting for the operator to start a session
//! - `Intro`: intro clips playing back-to-back; device input is ignored
//! - `Active`: the tick loop is running and the clock is counting
//! - `Solved`: the final puzzle reported success
//! - `TimedOut`: the clock ran out while the room was still active
//!
//! # Valid Transitions
//!
//! - Idle → Intro → Active → Solved/TimedOut → Idle
//!
//! # Examples
//!
//! ```
//! use puzzlebox_session::{SessionMachine, SessionPhase};
//!
//! let mut machine = SessionMachine::new();
//! machine.transition_to(SessionPhase::Intro).unwrap();
//! machine.transition_to(SessionPhase::Active).unwrap();
//!
//! // A session cannot end twice
//! machine.transition_to(SessionPhase::Solved).unwrap();
//! assert!(machine.transition_to(SessionPhase::TimedOut).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use puzzlebox_core::{Error, Result};

/// Maximum number of phase transitions to keep in history.
///
/// A session produces four transitions, so this covers the last 25 sessions.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the operator.
    Idle,

    /// Intro narration is playing.
    Intro,

    /// Players are in the room and the clock is running.
    Active,

    /// The final puzzle was solved.
    Solved,

    /// Time ran out.
    TimedOut,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Intro => "Intro",
            SessionPhase::Active => "Active",
            SessionPhase::Solved => "Solved",
            SessionPhase::TimedOut => "TimedOut",
        };
        write!(f, "{}", phase)
    }
}

impl SessionPhase {
    /// Check if transition to `target` is allowed from this phase.
    ///
    /// ```
    /// use puzzlebox_session::SessionPhase;
    ///
    /// assert!(SessionPhase::Idle.can_transition_to(&SessionPhase::Intro));
    /// assert!(!SessionPhase::Idle.can_transition_to(&SessionPhase::Active));
    /// ```
    pub fn can_transition_to(&self, target: &SessionPhase) -> bool {
        matches!(
            (self, target),
            (SessionPhase::Idle, SessionPhase::Intro)
                | (SessionPhase::Intro, SessionPhase::Active)
                | (
                    SessionPhase::Active,
                    SessionPhase::Solved | SessionPhase::TimedOut
                )
                | (SessionPhase::Solved, SessionPhase::Idle)
                | (SessionPhase::TimedOut, SessionPhase::Idle)
        )
    }
}

/// A single phase change with timestamp.
///
/// The timestamp is process-local and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: SessionPhase,
    pub to: SessionPhase,

    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl PhaseTransition {
    fn new(from: SessionPhase, to: SessionPhase) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Enforces the session phase order and records recent transitions.
#[derive(Debug)]
pub struct SessionMachine {
    phase: SessionPhase,
    history: VecDeque<PhaseTransition>,
}

impl SessionMachine {
    /// Create a machine in the `Idle` phase.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Move to `next`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if `next` is not reachable
    /// from the current phase. The machine is left unchanged.
    pub fn transition_to(&mut self, next: SessionPhase) -> Result<PhaseTransition> {
        if !self.phase.can_transition_to(&next) {
            return Err(Error::InvalidStateTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }

        let transition = PhaseTransition::new(self.phase, next);
        self.perform_phase_change(transition.clone());
        debug!("Session phase {} -> {}", transition.from, transition.to);
        Ok(transition)
    }

    /// Force the machine back to `Idle` from any phase, for a session that
    /// was abandoned part way.
    pub fn reset(&mut self) -> PhaseTransition {
        let transition = PhaseTransition::new(self.phase, SessionPhase::Idle);
        self.perform_phase_change(transition.clone());
        transition
    }

    fn perform_phase_change(&mut self, transition: PhaseTransition) {
        self.phase = transition.to;

        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}
