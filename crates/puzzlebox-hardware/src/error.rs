//! Errors raised by serial links and audio backends.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The link is gone; every later read on it fails too.
    #[error("{device} is disconnected")]
    Disconnected { device: String },

    #[error("{operation} is not available in this build")]
    Unsupported { operation: String },

    /// A read or flush on an open port failed.
    #[error("serial link error: {message}")]
    Serial { message: String },

    /// A port or audio device could not be opened.
    #[error("cannot open {target}")]
    Open { target: String },

    #[error("no device named {name:?}")]
    UnknownDevice { name: String },

    /// A clip could not be started.
    #[error("playback failed: {message}")]
    Playback { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn communication(message: impl Into<String>) -> Self {
        Self::Serial {
            message: message.into(),
        }
    }

    pub fn initialization_failed(target: impl Into<String>) -> Self {
        Self::Open {
            target: target.into(),
        }
    }

    pub fn unknown_device(name: impl Into<String>) -> Self {
        Self::UnknownDevice { name: name.into() }
    }

    pub fn audio(message: impl Into<String>) -> Self {
        Self::Playback {
            message: message.into(),
        }
    }
}
