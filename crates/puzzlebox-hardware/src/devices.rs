//! Enum wrappers for hardware dispatch.
//!
//! [`AudioOutput`] has an associated playback type, so it cannot be used as a
//! trait object. The enums below give the controller one concrete type per
//! concern while still allowing real drivers and mocks to be swapped, with
//! feature-gated backends compiled in only when enabled.
//!
//! # Examples
//!
//! ```
//! use puzzlebox_hardware::devices::AnySerialLink;
//! use puzzlebox_hardware::mock::MockSerialLink;
//!
//! let (link, _handle) = MockSerialLink::new();
//! let any_link = AnySerialLink::Mock(link);
//! ```

use std::path::Path;

use puzzlebox_core::config::{AudioBackendKind, AudioConfig};

use crate::Result;
use crate::audio::{CommandPlayback, CommandPlayer, NullAudio, NullPlayback};
#[cfg(feature = "rodio")]
use crate::audio::{RodioPlayback, RodioPlayer};
use crate::mock::{MockAudio, MockPlayback, MockSerialLink};
use crate::serial::SerialPortLink;
use crate::traits::{AudioOutput, Playback, SerialLink};

/// Enum wrapper for serial link dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySerialLink {
    /// OS serial port.
    Port(SerialPortLink),

    /// Mock link for development and testing.
    Mock(MockSerialLink),
}

impl SerialLink for AnySerialLink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self {
            Self::Port(link) => link.read_byte(),
            Self::Mock(link) => link.read_byte(),
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        match self {
            Self::Port(link) => link.clear_input(),
            Self::Mock(link) => link.clear_input(),
        }
    }
}

impl From<SerialPortLink> for AnySerialLink {
    fn from(link: SerialPortLink) -> Self {
        Self::Port(link)
    }
}

impl From<MockSerialLink> for AnySerialLink {
    fn from(link: MockSerialLink) -> Self {
        Self::Mock(link)
    }
}

/// Enum wrapper for audio output dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyAudioOutput {
    /// External player process per clip.
    Command(CommandPlayer),

    /// Log-only output.
    Null(NullAudio),

    /// In-process playback.
    #[cfg(feature = "rodio")]
    Rodio(RodioPlayer),

    /// Mock output for development and testing.
    Mock(MockAudio),
}

impl AnyAudioOutput {
    /// Build the backend selected in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized, or if it was
    /// not compiled into this build.
    pub fn from_config(config: &AudioConfig) -> Result<Self> {
        match config.backend {
            AudioBackendKind::Command => Ok(Self::Command(CommandPlayer::from_command(
                &config.command,
            )?)),
            AudioBackendKind::Null => Ok(Self::Null(NullAudio)),
            #[cfg(feature = "rodio")]
            AudioBackendKind::Rodio => Ok(Self::Rodio(RodioPlayer::try_default()?)),
            #[cfg(not(feature = "rodio"))]
            AudioBackendKind::Rodio => Err(crate::HardwareError::unsupported(
                "rodio audio backend (build with the `rodio` feature)",
            )),
        }
    }
}

impl AudioOutput for AnyAudioOutput {
    type Playback = AnyPlayback;

    fn play(&mut self, path: &Path) -> Result<AnyPlayback> {
        match self {
            Self::Command(audio) => audio.play(path).map(AnyPlayback::Command),
            Self::Null(audio) => audio.play(path).map(AnyPlayback::Null),
            #[cfg(feature = "rodio")]
            Self::Rodio(audio) => audio.play(path).map(AnyPlayback::Rodio),
            Self::Mock(audio) => audio.play(path).map(AnyPlayback::Mock),
        }
    }
}

impl From<MockAudio> for AnyAudioOutput {
    fn from(audio: MockAudio) -> Self {
        Self::Mock(audio)
    }
}

/// Playback handle matching [`AnyAudioOutput`].
#[derive(Debug)]
pub enum AnyPlayback {
    Command(CommandPlayback),
    Null(NullPlayback),
    #[cfg(feature = "rodio")]
    Rodio(RodioPlayback),
    Mock(MockPlayback),
}

impl Playback for AnyPlayback {
    fn stop(&mut self) {
        match self {
            Self::Command(p) => p.stop(),
            Self::Null(p) => p.stop(),
            #[cfg(feature = "rodio")]
            Self::Rodio(p) => p.stop(),
            Self::Mock(p) => p.stop(),
        }
    }

    fn is_finished(&mut self) -> bool {
        match self {
            Self::Command(p) => p.is_finished(),
            Self::Null(p) => p.is_finished(),
            #[cfg(feature = "rodio")]
            Self::Rodio(p) => p.is_finished(),
            Self::Mock(p) => p.is_finished(),
        }
    }
}
