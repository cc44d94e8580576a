//! `puzzlebox monitor`: print board traffic without reacting to it.
//!
//! Handy when wiring a new board: every complete line from every device is
//! echoed with the device name.

use puzzlebox_core::PuzzleConfig;
use tracing::info;

use super::connect_devices;

pub async fn monitor(config: PuzzleConfig) -> anyhow::Result<()> {
    let mut registry = connect_devices(&config).await;
    let tick = config.timing.tick_interval();

    for status in registry.statuses() {
        info!("{}", status);
    }

    let echo = async {
        loop {
            for (device, message) in registry.poll_messages() {
                println!("{device}: {message}");
            }
            tokio::time::sleep(tick).await;
        }
    };

    tokio::select! {
        _ = echo => {}
        _ = tokio::signal::ctrl_c() => {}
    }

    registry.shutdown();
    Ok(())
}
