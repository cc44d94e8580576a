//! Hardware layer for the puzzlebox room controller.
//!
//! The controller needs two kinds of hardware: serial links to the
//! microcontroller boards wired into the room, and an audio output for cues.
//! This crate defines narrow traits for both, real implementations, mock
//! implementations for tests and dry runs, and the [`DeviceRegistry`] that
//! owns every configured board.
//!
//! # Serial links
//!
//! [`SerialLink`] exposes a non-blocking "read a byte if one is waiting"
//! primitive plus an input flush. [`serial::SerialPortLink`] implements it
//! over an OS serial port; [`mock::MockSerialLink`] over a channel.
//!
//! ```
//! use puzzlebox_hardware::traits::SerialLink;
//! use puzzlebox_hardware::mock::MockSerialLink;
//!
//! let (mut link, handle) = MockSerialLink::new();
//! handle.send_line("10").unwrap();
//! assert_eq!(link.read_byte().unwrap(), Some(b'1'));
//! ```
//!
//! # Audio
//!
//! [`AudioOutput::play`] starts a clip and returns a [`Playback`] handle
//! that can be stopped or polled for completion. Waiting for a clip is built
//! on top by the session crate.
//!
//! # Concurrency
//!
//! Everything here is driven from one task on a current-thread runtime, so
//! the traits are synchronous and carry no `Send` bounds. Nothing in this
//! crate blocks on input.

pub mod audio;
pub mod devices;
pub mod error;
pub mod mock;
pub mod registry;
pub mod serial;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyAudioOutput, AnyPlayback, AnySerialLink};
pub use error::{HardwareError, Result};
pub use registry::DeviceRegistry;
pub use traits::{AudioOutput, Playback, SerialLink};
pub use types::DeviceStatus;
