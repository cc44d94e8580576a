//! Common types shared across hardware implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection status of one configured board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Logical device name from the configuration.
    pub name: String,

    /// Serial port path, if one is configured.
    pub port: Option<String>,

    /// Whether the device is currently delivering messages.
    pub connected: bool,
}

impl DeviceStatus {
    /// Create a status entry.
    pub fn new(name: impl Into<String>, port: Option<String>, connected: bool) -> Self {
        Self {
            name: name.into(),
            port,
            connected,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.connected {
            "connected"
        } else {
            "disconnected"
        };
        match &self.port {
            Some(port) => write!(f, "{} ({}): {}", self.name, port, state),
            None => write!(f, "{} (no port): {}", self.name, state),
        }
    }
}
