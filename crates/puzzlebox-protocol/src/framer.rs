//! Line framer for board messages.
//!
//! This module reassembles the byte stream of one serial link into complete
//! lines. It is pull-based: the caller hands the framer a "next available
//! byte" source and the framer drains it until either the source is empty or
//! a complete line is held.
//!
//! # Framing
//!
//! ```text
//! '2' '0' '\n'  '\r' '\n'  '2' '1' '\r'
//! └── "20" ──┘  (empty,    └── "21" ──┘
//!                ignored)
//! ```
//!
//! - `\n` and `\r` both terminate a line.
//! - A terminator on an empty or all-whitespace buffer is ignored.
//! - Non-ASCII bytes are dropped one by one; framing continues.
//! - A line longer than [`MAX_LINE_LENGTH`] is dropped up to and including
//!   its terminator.
//!
//! # Backpressure
//!
//! The framer holds at most one unread line. Once a line is complete it stops
//! reading from the source, so later bytes stay queued in the link (the OS
//! serial buffer in production) until the held line is taken. An unread line
//! is never overwritten.
//!
//! # Usage
//!
//! ```
//! use std::collections::VecDeque;
//! use std::convert::Infallible;
//! use puzzlebox_protocol::LineFramer;
//!
//! let mut link: VecDeque<u8> = b"20\n21\n".iter().copied().collect();
//! let mut framer = LineFramer::new();
//!
//! let first = framer.take_message(|| Ok::<_, Infallible>(link.pop_front())).unwrap();
//! assert_eq!(first.as_deref(), Some("20"));
//!
//! // "21\n" was not read yet
//! assert_eq!(link.len(), 3);
//!
//! let second = framer.take_message(|| Ok::<_, Infallible>(link.pop_front())).unwrap();
//! assert_eq!(second.as_deref(), Some("21"));
//! ```

use std::mem;

use puzzlebox_core::constants::{CARRIAGE_RETURN, LINE_FEED, MAX_LINE_LENGTH};
use tracing::{trace, warn};

/// Per-device line reassembly state.
///
/// Invariant: when [`is_ready`](Self::is_ready) returns `true` the buffer
/// holds a complete, non-empty line without its terminator.
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    /// Characters of the line being assembled (or the held line).
    buffer: String,

    /// A complete line is held and waiting to be taken.
    ready: bool,

    /// The current line overflowed; skip bytes until its terminator.
    discarding: bool,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain currently available bytes into the buffer.
    ///
    /// `next_byte` must return `Ok(None)` as soon as no byte is available;
    /// the framer never waits for more input. Draining stops early once a
    /// line is complete. Does nothing while a line is already held.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `next_byte`. Bytes read before
    /// the error stay buffered.
    pub fn feed<E, F>(&mut self, mut next_byte: F) -> Result<(), E>
    where
        F: FnMut() -> Result<Option<u8>, E>,
    {
        if self.ready {
            return Ok(());
        }

        while let Some(byte) = next_byte()? {
            if self.push_byte(byte) {
                break;
            }
        }

        Ok(())
    }

    /// Take the held line, trimmed of surrounding whitespace.
    ///
    /// Feeds from `next_byte` first when no line is held.
    ///
    /// # Errors
    ///
    /// Propagates errors from `next_byte`.
    pub fn take_message<E, F>(&mut self, next_byte: F) -> Result<Option<String>, E>
    where
        F: FnMut() -> Result<Option<u8>, E>,
    {
        Ok(self
            .take_raw_message(next_byte)?
            .map(|line| line.trim().to_string()))
    }

    /// Take the held line exactly as received (terminator stripped, no trim).
    ///
    /// # Errors
    ///
    /// Propagates errors from `next_byte`.
    pub fn take_raw_message<E, F>(&mut self, next_byte: F) -> Result<Option<String>, E>
    where
        F: FnMut() -> Result<Option<u8>, E>,
    {
        if !self.ready {
            self.feed(next_byte)?;
        }
        Ok(self.take_ready())
    }

    /// Check whether a complete line is held.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of characters buffered (held line or partial line).
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discard the held line and any partial line.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ready = false;
        self.discarding = false;
    }

    /// Append one byte; returns `true` when it completed a line.
    fn push_byte(&mut self, byte: u8) -> bool {
        match byte {
            LINE_FEED | CARRIAGE_RETURN => {
                if self.discarding {
                    self.discarding = false;
                    return false;
                }
                if self.buffer.trim().is_empty() {
                    self.buffer.clear();
                    return false;
                }
                self.ready = true;
                true
            }
            _ if self.discarding => false,
            b if b.is_ascii() => {
                if self.buffer.len() >= MAX_LINE_LENGTH {
                    warn!(
                        "Discarding line longer than {} characters",
                        MAX_LINE_LENGTH
                    );
                    self.buffer.clear();
                    self.discarding = true;
                    return false;
                }
                self.buffer.push(char::from(b));
                false
            }
            _ => {
                trace!("Dropping non-ASCII byte {:#04x}", byte);
                false
            }
        }
    }

    fn take_ready(&mut self) -> Option<String> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(mem::take(&mut self.buffer))
    }
}
