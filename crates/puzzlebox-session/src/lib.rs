//! Session logic for the puzzlebox room controller.
//!
//! This crate turns board messages into room behavior: it owns the session
//! phase machine, the session clock with its time warnings, the audio cue
//! policy and the code dispatcher, and ties them together in
//! [`SessionController`].

pub mod clock;
pub mod controller;
pub mod cue;
pub mod dispatcher;
pub mod state_machine;

pub use clock::{SessionClock, TimeWarning};
pub use controller::{SessionController, SessionOutcome, SessionReport};
pub use cue::{ClipLibrary, CueController};
pub use dispatcher::{Dispatcher, OneShotFlags, SessionSignal};
pub use state_machine::{PhaseTransition, SessionMachine, SessionPhase};
