//! Subcommand implementations.

pub mod check;
pub mod monitor;
pub mod run;

use puzzlebox_core::PuzzleConfig;
use puzzlebox_hardware::serial::SerialPortLink;
use puzzlebox_hardware::{AnySerialLink, DeviceRegistry};
use tracing::warn;

/// Build the registry and open every configured serial port.
pub async fn connect_devices(config: &PuzzleConfig) -> DeviceRegistry {
    let mut registry = DeviceRegistry::from_config(config);
    let connected = registry
        .initialize(config.serial.baud_rate, |_name, port, baud| {
            SerialPortLink::open(port, baud).map(AnySerialLink::from)
        })
        .await;

    if connected < registry.len() {
        warn!(
            "{} of {} devices connected",
            connected,
            registry.len()
        );
    }
    registry
}
