//! Serial port link to a room board.

use std::fmt;
use std::io::{self, Read};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::debug;

use crate::traits::SerialLink;
use crate::{HardwareError, Result};

/// Read timeout for the underlying port. Reads only happen when bytes are
/// already waiting, so this merely bounds a misbehaving driver.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// A board attached through an OS serial port (USB CDC, FTDI, ...).
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortLink {
    /// Open `path` at `baud_rate`.
    ///
    /// Opening most Arduino-style boards resets them; callers should wait
    /// for the board to boot and then flush the input.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Open`] if the port cannot be
    /// opened.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| HardwareError::initialization_failed(format!("{path}: {e}")))?;

        debug!("Opened serial port {} at {} baud", path, baud_rate);

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Path the link was opened on.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SerialLink for SerialPortLink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let waiting = self
            .port
            .bytes_to_read()
            .map_err(|e| HardwareError::communication(format!("{}: {e}", self.path)))?;
        if waiting == 0 {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Err(HardwareError::disconnected(&self.path)),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| HardwareError::communication(format!("{}: {e}", self.path)))
    }
}

impl fmt::Debug for SerialPortLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPortLink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
