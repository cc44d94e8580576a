//! The session controller: one run of the room from start trigger to solve
//! or timeout.
//!
//! # Session flow
//!
//! ```text
//! Idle ──► Intro ──► Active ──┬──► Solved ───┬──► Idle
//!  │        │          │      └──► TimedOut ─┘
//!  │        │          │              │
//!  flush    intro      tick loop      outro
//!  stale    clips      (devices,
//!  input    (waited)   warnings,
//!                      timeout)
//! ```
//!
//! Each tick of the active loop takes at most one message from every
//! connected device and dispatches it, plays any time warnings that came due,
//! and then checks whether the session is over. Cue waits stall the loop;
//! messages arriving meanwhile stay queued in their links.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use puzzlebox_core::{ClipId, PuzzleConfig, Result};
use puzzlebox_hardware::{AudioOutput, DeviceRegistry};
use puzzlebox_protocol::CodeTable;
use serde::Serialize;
use tracing::{info, warn};

use crate::clock::SessionClock;
use crate::cue::{ClipLibrary, CueController};
use crate::dispatcher::{Dispatcher, SessionSignal};
use crate::state_machine::{SessionMachine, SessionPhase};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Solved,
    TimedOut,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solved => write!(f, "solved"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub outcome: SessionOutcome,

    /// Wall-clock time the players entered (start of the active phase).
    pub started_at: DateTime<Utc>,

    /// Active time on the session clock when the session ended.
    pub elapsed: Duration,

    pub warnings_fired: usize,
    pub messages_handled: usize,
    pub stale_discarded: usize,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs();
        write!(
            f,
            "session started {} {} after {}:{:02} ({} warnings, {} messages)",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.outcome,
            secs / 60,
            secs % 60,
            self.warnings_fired,
            self.messages_handled,
        )
    }
}

/// Runs sessions against a device registry and an audio output.
#[derive(Debug)]
pub struct SessionController<A: AudioOutput> {
    registry: DeviceRegistry,
    cues: CueController<A>,
    dispatcher: Dispatcher,
    clock: SessionClock,
    machine: SessionMachine,
    intro: Vec<ClipId>,
    outro: Option<ClipId>,
    tick_interval: Duration,
}

impl<A: AudioOutput> SessionController<A> {
    /// Build a controller from a loaded configuration.
    pub fn from_config(config: &PuzzleConfig, registry: DeviceRegistry, audio: A) -> Self {
        let library: ClipLibrary = config
            .clips
            .iter()
            .map(|(clip, path)| (clip.clone(), path.clone()))
            .collect();
        let cues = CueController::new(audio, library)
            .with_poll_interval(config.timing.cue_poll_interval());

        Self {
            registry,
            cues,
            dispatcher: Dispatcher::new(CodeTable::from_config(&config.codes)),
            clock: SessionClock::from_config(&config.session),
            machine: SessionMachine::new(),
            intro: config.session.intro.clone(),
            outro: config.session.outro.clone(),
            tick_interval: config.timing.tick_interval(),
        }
    }

    /// Run one complete session and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the controller is not idle.
    pub async fn run_session(&mut self) -> Result<SessionReport> {
        if self.machine.phase() != SessionPhase::Idle {
            return Err(puzzlebox_core::Error::InvalidStateTransition {
                from: self.machine.phase().to_string(),
                to: SessionPhase::Intro.to_string(),
            });
        }

        // Leave nothing from a previous run for this one
        let stale_discarded = self.registry.discard_pending();
        self.dispatcher.reset_flags();
        self.cues.stop_current();

        self.machine.transition_to(SessionPhase::Intro)?;
        info!("Session starting with {} intro clips", self.intro.len());
        for clip in &self.intro {
            self.cues.play_and_wait(clip).await;
        }

        self.machine.transition_to(SessionPhase::Active)?;
        self.clock.start();
        let started_at = Utc::now();
        info!(
            "Session active: {} devices connected, {}s on the clock",
            self.registry.connected_count(),
            self.clock.max_duration().as_secs()
        );

        let (outcome, messages_handled) = match self.run_active().await {
            Ok(result) => result,
            Err(e) => {
                self.abandon();
                return Err(e);
            }
        };
        let elapsed = self.clock.elapsed();
        let warnings_fired = self.clock.fired_count();

        if outcome == SessionOutcome::TimedOut
            && let Some(clip) = &self.outro
        {
            self.cues.play_and_wait(clip).await;
        }
        self.cues.stop_current();

        self.machine.transition_to(SessionPhase::Idle)?;

        let report = SessionReport {
            outcome,
            started_at,
            elapsed,
            warnings_fired,
            messages_handled,
            stale_discarded,
        };
        info!("{}", report);
        Ok(report)
    }

    /// The active tick loop. Returns the outcome and number of messages
    /// dispatched.
    async fn run_active(&mut self) -> Result<(SessionOutcome, usize)> {
        let mut messages_handled = 0;

        loop {
            for (device, message) in self.registry.poll_messages() {
                messages_handled += 1;
                let signal = self
                    .dispatcher
                    .handle(&device, &message, &mut self.cues)
                    .await;
                if signal == SessionSignal::Solved {
                    self.machine.transition_to(SessionPhase::Solved)?;
                    info!(device = %device, "Room solved");
                    return Ok((SessionOutcome::Solved, messages_handled));
                }
            }

            for clip in self.clock.poll_warnings() {
                info!(
                    "Time warning {} ({}s remaining)",
                    clip,
                    self.clock.remaining().as_secs()
                );
                self.cues.play_and_wait(&clip).await;
            }

            if self.clock.expired() {
                self.machine.transition_to(SessionPhase::TimedOut)?;
                warn!("Session timed out");
                return Ok((SessionOutcome::TimedOut, messages_handled));
            }

            tokio::time::sleep(self.tick_interval).await;
        }
    }

    /// Stop any cue and close every device connection.
    ///
    /// A session that was interrupted part way is abandoned and the
    /// controller returns to `Idle`.
    pub fn shutdown(&mut self) {
        if self.machine.phase() != SessionPhase::Idle {
            self.abandon();
        }
        self.cues.stop_current();
        self.registry.shutdown();
    }

    fn abandon(&mut self) {
        self.cues.stop_current();
        let transition = self.machine.reset();
        warn!("Session abandoned in phase {}", transition.from);
    }

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }
}
