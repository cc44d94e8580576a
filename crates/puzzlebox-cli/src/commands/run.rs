//! `puzzlebox run`: the operator console.

use std::collections::BTreeMap;

use anyhow::Context;
use puzzlebox_core::PuzzleConfig;
use puzzlebox_hardware::mock::{MockSerialHandle, MockSerialLink};
use puzzlebox_hardware::{AnyAudioOutput, DeviceRegistry};
use puzzlebox_session::SessionController;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use super::connect_devices;

type Console = Lines<BufReader<Stdin>>;

pub async fn run(config: PuzzleConfig, simulate: bool) -> anyhow::Result<()> {
    // Missing clip files must stop the room before anyone is let in
    config
        .validate(true)
        .context("configuration is not ready for a session")?;

    let audio = AnyAudioOutput::from_config(&config.audio).context("failed to open audio output")?;

    let (registry, boards) = if simulate {
        simulated_devices(&config)?
    } else {
        (connect_devices(&config).await, BTreeMap::new())
    };

    let mut controller = SessionController::from_config(&config, registry, audio);
    let mut console = BufReader::new(tokio::io::stdin()).lines();

    let result = session_loop(&mut controller, &mut console, &boards).await;

    info!("Shutting down");
    controller.shutdown();
    result
}

async fn session_loop(
    controller: &mut SessionController<AnyAudioOutput>,
    console: &mut Console,
    boards: &BTreeMap<String, MockSerialHandle>,
) -> anyhow::Result<()> {
    loop {
        println!("Press Enter to start a session (Ctrl-C to quit)");
        tokio::select! {
            line = console.next_line() => {
                if line.context("failed to read console")?.is_none() {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }

        let session = controller.run_session();
        tokio::pin!(session);

        let report = loop {
            tokio::select! {
                report = &mut session => break report?,
                line = console.next_line(), if !boards.is_empty() => {
                    match line.context("failed to read console")? {
                        Some(line) => feed_simulated(boards, &line),
                        None => return Ok(()),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Session interrupted");
                    return Ok(());
                }
            }
        };

        println!("{report}");
    }
}

/// Attach a mock link to every configured device instead of opening ports.
fn simulated_devices(
    config: &PuzzleConfig,
) -> anyhow::Result<(DeviceRegistry, BTreeMap<String, MockSerialHandle>)> {
    let mut registry = DeviceRegistry::from_config(config);
    let mut boards = BTreeMap::new();

    for name in config.devices.keys() {
        let (link, handle) = MockSerialLink::with_name(name.as_str());
        registry.attach(name, link.into())?;
        boards.insert(name.clone(), handle);
    }

    info!(
        "Simulating {} devices; type `<device> <code>` during a session",
        boards.len()
    );
    Ok((registry, boards))
}

/// Deliver `<device> <code>` (or just `<code>` for the first device).
fn feed_simulated(boards: &BTreeMap<String, MockSerialHandle>, line: &str) {
    let line = line.trim();
    let (device, code) = match line.split_once(char::is_whitespace) {
        Some((device, code)) => (Some(device), code.trim()),
        None => (None, line),
    };

    let board = match device {
        Some(device) => boards.get(device),
        None => boards.values().next(),
    };

    match board {
        Some(board) => {
            if let Err(e) = board.send_line(code) {
                warn!("Simulated {} is gone: {}", board.name(), e);
            }
        }
        None => warn!("No simulated device {:?}", device.unwrap_or_default()),
    }
}
