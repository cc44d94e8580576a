//! Session clock and time warnings.
//!
//! A warning is declared as "`remaining` left on the clock"; its deadline is
//! `max_duration - remaining` after the start. Warnings are kept sorted by
//! deadline so several becoming due in the same tick fire in order.
//!
//! Time is read from [`tokio::time::Instant`], which lets tests drive a
//! twenty-minute session under a paused clock.

use std::time::Duration;

use puzzlebox_core::ClipId;
use puzzlebox_core::config::SessionConfig;
use tokio::time::Instant;

/// A clip to play when a given amount of time remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWarning {
    pub remaining: Duration,
    pub clip: ClipId,
}

impl TimeWarning {
    pub fn new(remaining: Duration, clip: impl Into<ClipId>) -> Self {
        Self {
            remaining,
            clip: clip.into(),
        }
    }
}

/// Tracks elapsed time for one session.
#[derive(Debug, Clone)]
pub struct SessionClock {
    max_duration: Duration,
    warnings: Vec<TimeWarning>,
    fired: Vec<bool>,
    started_at: Option<Instant>,
}

impl SessionClock {
    /// Create a stopped clock.
    pub fn new(max_duration: Duration, mut warnings: Vec<TimeWarning>) -> Self {
        // Largest remaining time means earliest deadline
        warnings.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        let fired = vec![false; warnings.len()];
        Self {
            max_duration,
            warnings,
            fired,
            started_at: None,
        }
    }

    /// Create a stopped clock from the `[session]` configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        let warnings = config
            .warnings
            .iter()
            .map(|w| TimeWarning::new(Duration::from_secs(w.remaining_secs), w.clip.clone()))
            .collect();
        Self::new(config.duration(), warnings)
    }

    /// Start (or restart) the clock and re-arm every warning.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.fired.fill(false);
    }

    /// Whether [`start`](Self::start) has been called.
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time since the start; zero before the clock is started.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Time left before the session expires.
    pub fn remaining(&self) -> Duration {
        self.max_duration.saturating_sub(self.elapsed())
    }

    /// Configured session length.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Warnings in deadline order.
    pub fn warnings(&self) -> &[TimeWarning] {
        &self.warnings
    }

    /// Return the clips of warnings that became due since the last call.
    ///
    /// Each warning fires at most once per started session. Nothing fires
    /// while the clock is stopped.
    pub fn poll_warnings(&mut self) -> Vec<ClipId> {
        if !self.is_started() {
            return Vec::new();
        }

        let elapsed = self.elapsed();
        let mut due = Vec::new();
        for (index, warning) in self.warnings.iter().enumerate() {
            if !self.fired[index] && elapsed >= self.deadline(warning) {
                self.fired[index] = true;
                due.push(warning.clip.clone());
            }
        }
        due
    }

    /// Number of warnings fired since the last start.
    pub fn fired_count(&self) -> usize {
        self.fired.iter().filter(|fired| **fired).count()
    }

    /// Whether the session has run out of time.
    pub fn expired(&self) -> bool {
        self.is_started() && self.expired_at(self.elapsed())
    }

    /// Clips of every warning due at `elapsed`, ignoring what already fired.
    pub fn warnings_due_at(&self, elapsed: Duration) -> Vec<&ClipId> {
        self.warnings
            .iter()
            .filter(|warning| elapsed >= self.deadline(warning))
            .map(|warning| &warning.clip)
            .collect()
    }

    /// Whether a session would be expired at `elapsed`.
    pub fn expired_at(&self, elapsed: Duration) -> bool {
        elapsed >= self.max_duration
    }

    fn deadline(&self, warning: &TimeWarning) -> Duration {
        self.max_duration.saturating_sub(warning.remaining)
    }
}
