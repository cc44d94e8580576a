//! Device registry.
//!
//! The registry owns every configured board: its serial link (if connected)
//! and its [`LineFramer`]. It is polled from the session's tick loop, one
//! message per device per tick.
//!
//! # Lifecycle
//!
//! 1. Build from configuration with [`DeviceRegistry::from_config`]
//! 2. Open ports with [`DeviceRegistry::initialize`] (or inject links with
//!    [`DeviceRegistry::attach`])
//! 3. Poll with [`DeviceRegistry::poll_messages`]
//! 4. Close everything with [`DeviceRegistry::shutdown`]
//!
//! A device whose link fails at any point is disconnected for the rest of the
//! process. Link errors are logged here and never reach the caller.
//!
//! # Examples
//!
//! ```
//! use puzzlebox_hardware::registry::DeviceRegistry;
//! use puzzlebox_hardware::mock::MockSerialLink;
//!
//! let mut registry = DeviceRegistry::new();
//! registry.add_device("engine-room", None);
//!
//! let (link, handle) = MockSerialLink::with_name("engine-room");
//! registry.attach("engine-room", link.into()).unwrap();
//!
//! handle.send_line("20").unwrap();
//! assert_eq!(
//!     registry.poll_messages(),
//!     vec![("engine-room".to_string(), "20".to_string())]
//! );
//! ```

use std::time::Duration;

use puzzlebox_core::PuzzleConfig;
use puzzlebox_protocol::LineFramer;
use tracing::{debug, info, warn};

use crate::devices::AnySerialLink;
use crate::traits::SerialLink;
use crate::types::DeviceStatus;
use crate::{HardwareError, Result};

/// One configured board.
#[derive(Debug)]
pub struct Device {
    name: String,
    port: Option<String>,
    link: Option<AnySerialLink>,
    framer: LineFramer,
}

impl Device {
    fn new(name: impl Into<String>, port: Option<String>) -> Self {
        Self {
            name: name.into(),
            port,
            link: None,
            framer: LineFramer::new(),
        }
    }

    /// Logical device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured serial port, if any.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Whether the device has a working link.
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Take the next complete message, if any.
    ///
    /// On a link error the device is disconnected and `None` is returned.
    fn take_message(&mut self) -> Option<String> {
        let link = self.link.as_mut()?;
        match self.framer.take_message(|| link.read_byte()) {
            Ok(message) => {
                if let Some(message) = &message {
                    debug!(device = %self.name, "Received {:?}", message);
                }
                message
            }
            Err(e) => {
                self.disconnect(&e);
                None
            }
        }
    }

    /// Drop every complete and partial message. Returns the number of
    /// complete messages discarded.
    fn discard_pending(&mut self) -> usize {
        let mut discarded = 0;
        while self.take_message().is_some() {
            discarded += 1;
        }
        self.framer.clear();
        if let Some(link) = self.link.as_mut()
            && let Err(e) = link.clear_input()
        {
            self.disconnect(&e);
        }
        discarded
    }

    fn disconnect(&mut self, error: &HardwareError) {
        warn!(device = %self.name, "Disconnecting after link error: {}", error);
        self.link = None;
        self.framer.clear();
    }

    fn status(&self) -> DeviceStatus {
        DeviceStatus::new(&self.name, self.port.clone(), self.is_connected())
    }
}

/// Owns every configured device, in configuration order.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    settle_delay: Duration,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    /// Create an empty registry with no settle delay.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            settle_delay: Duration::ZERO,
        }
    }

    /// Create a registry with every device from the configuration.
    pub fn from_config(config: &PuzzleConfig) -> Self {
        let mut registry = Self::new().with_settle_delay(config.serial.settle_delay());
        for (name, device) in &config.devices {
            registry.add_device(name.clone(), device.port.clone());
        }
        registry
    }

    /// Set how long to wait after opening a port before flushing it.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Register a device. A device without a port stays disconnected unless
    /// a link is attached.
    pub fn add_device(&mut self, name: impl Into<String>, port: Option<String>) {
        self.devices.push(Device::new(name, port));
    }

    /// Open every device that has a port.
    ///
    /// `open` receives `(name, port, baud_rate)`. After each successful open
    /// the registry waits the settle delay (boards reset when their port is
    /// opened) and flushes the input buffer. Failures are logged and leave
    /// the device disconnected. Returns the number of connected devices.
    pub async fn initialize<F>(&mut self, baud_rate: u32, mut open: F) -> usize
    where
        F: FnMut(&str, &str, u32) -> Result<AnySerialLink>,
    {
        for device in &mut self.devices {
            let Some(port) = device.port.clone() else {
                debug!(device = %device.name, "No port configured; leaving disconnected");
                continue;
            };

            let mut link = match open(&device.name, &port, baud_rate) {
                Ok(link) => link,
                Err(e) => {
                    warn!(device = %device.name, "Failed to open {}: {}", port, e);
                    continue;
                }
            };

            tokio::time::sleep(self.settle_delay).await;

            if let Err(e) = link.clear_input() {
                warn!(device = %device.name, "Failed to flush {}: {}", port, e);
                continue;
            }

            info!(device = %device.name, "Connected on {}", port);
            device.framer.clear();
            device.link = Some(link);
        }

        self.connected_count()
    }

    /// Attach an already-open link to a registered device.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::UnknownDevice`] if no device has this name.
    pub fn attach(&mut self, name: &str, link: AnySerialLink) -> Result<()> {
        let device = self
            .device_mut(name)
            .ok_or_else(|| HardwareError::unknown_device(name))?;
        device.framer.clear();
        device.link = Some(link);
        Ok(())
    }

    /// Close every connection. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        for device in &mut self.devices {
            if device.link.take().is_some() {
                info!(device = %device.name, "Closed connection");
            }
            device.framer.clear();
        }
    }

    /// Take at most one message from each connected device, in registry
    /// order.
    pub fn poll_messages(&mut self) -> Vec<(String, String)> {
        self.devices
            .iter_mut()
            .filter_map(|device| {
                device
                    .take_message()
                    .map(|message| (device.name.clone(), message))
            })
            .collect()
    }

    /// Discard all buffered input on every device. Returns the number of
    /// complete messages thrown away.
    pub fn discard_pending(&mut self) -> usize {
        let discarded: usize = self
            .devices
            .iter_mut()
            .map(Device::discard_pending)
            .sum();
        if discarded > 0 {
            debug!("Discarded {} stale messages", discarded);
        }
        discarded
    }

    /// Number of devices with a working link.
    pub fn connected_count(&self) -> usize {
        self.devices.iter().filter(|d| d.is_connected()).count()
    }

    /// Names of all registered devices.
    pub fn device_names(&self) -> Vec<&str> {
        self.devices.iter().map(Device::name).collect()
    }

    /// Whether the named device is connected. Unknown names are not.
    pub fn is_connected(&self, name: &str) -> bool {
        self.devices
            .iter()
            .any(|d| d.name == name && d.is_connected())
    }

    /// Status of every registered device.
    pub fn statuses(&self) -> Vec<DeviceStatus> {
        self.devices.iter().map(Device::status).collect()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn device_mut(&mut self, name: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.name == name)
    }
}
