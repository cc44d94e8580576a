//! Mock serial link for testing and development.
//!
//! This module provides a simulated board connection whose input is fed
//! programmatically through a [`MockSerialHandle`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::{HardwareError, Result, traits::SerialLink};

/// Mock serial link for testing and development.
///
/// Bytes sent through the paired handle become readable from the link in
/// order. Dropping every handle simulates unplugging the board: once the
/// queued bytes are consumed, reads fail with
/// [`HardwareError::Disconnected`].
///
/// # Examples
///
/// ```
/// use puzzlebox_hardware::mock::MockSerialLink;
/// use puzzlebox_hardware::traits::SerialLink;
///
/// let (mut link, handle) = MockSerialLink::with_name("engine-room");
/// handle.send_line("20").unwrap();
///
/// assert_eq!(link.read_byte().unwrap(), Some(b'2'));
/// assert_eq!(link.read_byte().unwrap(), Some(b'0'));
/// assert_eq!(link.read_byte().unwrap(), Some(b'\n'));
/// assert_eq!(link.read_byte().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MockSerialLink {
    /// Channel receiver for simulated input
    input_rx: mpsc::UnboundedReceiver<u8>,

    /// Device name
    name: String,

    /// Number of input flushes performed
    flushes: Arc<AtomicUsize>,
}

impl MockSerialLink {
    /// Create a new mock link with the default name.
    pub fn new() -> (Self, MockSerialHandle) {
        Self::with_name("Mock Serial")
    }

    /// Create a new mock link with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockSerialHandle) {
        let name = name.into();
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let flushes = Arc::new(AtomicUsize::new(0));

        let link = Self {
            input_rx,
            name: name.clone(),
            flushes: Arc::clone(&flushes),
        };

        let handle = MockSerialHandle {
            input_tx,
            name,
            flushes,
        };

        (link, handle)
    }
}

impl SerialLink for MockSerialLink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.input_rx.try_recv() {
            Ok(byte) => Ok(Some(byte)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected(&self.name)),
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        loop {
            match self.input_rx.try_recv() {
                Ok(_) => continue,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(HardwareError::disconnected(&self.name));
                }
            }
        }
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handle for feeding a mock serial link.
///
/// The handle can be cloned and moved into other tasks; the link stays
/// connected as long as one handle is alive.
#[derive(Debug, Clone)]
pub struct MockSerialHandle {
    /// Channel sender for simulated input
    input_tx: mpsc::UnboundedSender<u8>,

    /// Device name
    name: String,

    /// Number of input flushes performed on the link
    flushes: Arc<AtomicUsize>,
}

impl MockSerialHandle {
    /// Queue raw bytes on the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the link has been dropped.
    pub fn send(&self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.input_tx
                .send(byte)
                .map_err(|_| HardwareError::disconnected(&self.name))?;
        }
        Ok(())
    }

    /// Queue a message followed by `\n`, the way a board prints it.
    ///
    /// # Errors
    ///
    /// Returns an error if the link has been dropped.
    pub fn send_line(&self, line: &str) -> Result<()> {
        self.send(line.as_bytes())?;
        self.send(b"\n")
    }

    /// Number of times the link's input buffer was flushed.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
