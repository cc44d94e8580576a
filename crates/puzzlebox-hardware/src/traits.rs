//! Hardware collaborator traits.
//!
//! The controller talks to exactly two kinds of hardware: serial links to the
//! room's boards and an audio output for cues. Both are consumed through the
//! narrow traits below so real drivers and mocks can be swapped freely.
//!
//! The whole controller runs on a single thread, so these traits carry no
//! `Send`/`Sync` bounds (some audio backends own thread-bound handles).

use std::path::Path;

use crate::error::Result;

/// Byte-stream link to one board.
///
/// # Examples
///
/// ```
/// use puzzlebox_hardware::traits::SerialLink;
/// use puzzlebox_hardware::mock::MockSerialLink;
///
/// let (mut link, handle) = MockSerialLink::new();
/// handle.send(b"7").unwrap();
///
/// assert_eq!(link.read_byte().unwrap(), Some(b'7'));
/// assert_eq!(link.read_byte().unwrap(), None);
/// ```
pub trait SerialLink {
    /// Read one byte if one is already available.
    ///
    /// Must return `Ok(None)` immediately when no byte is waiting; never
    /// blocks for more input.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is broken. Callers treat this as a
    /// permanent disconnection.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Discard everything waiting in the input buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the link is broken.
    fn clear_input(&mut self) -> Result<()>;
}

/// Audio output able to start clips asynchronously.
pub trait AudioOutput {
    /// Handle to one playing clip.
    type Playback: Playback;

    /// Start playing the file at `path` and return immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the clip cannot be opened or started.
    fn play(&mut self, path: &Path) -> Result<Self::Playback>;
}

/// A clip started by an [`AudioOutput`].
pub trait Playback {
    /// Request immediate termination. No-op if the clip already ended.
    fn stop(&mut self);

    /// Check whether the clip reached its end or was stopped.
    fn is_finished(&mut self) -> bool;
}
