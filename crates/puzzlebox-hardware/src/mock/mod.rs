//! Mock device implementations for testing and development.
//!
//! These stand in for the room's boards and speakers and can be driven
//! programmatically without any hardware attached.

pub mod audio;
pub mod serial;

pub use audio::{AudioEvent, AudioRecord, MockAudio, MockAudioHandle, MockPlayback};
pub use serial::{MockSerialHandle, MockSerialLink};
