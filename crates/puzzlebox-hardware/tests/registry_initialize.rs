//! Integration tests for opening devices through the registry.

use std::collections::HashMap;
use std::time::Duration;

use puzzlebox_core::PuzzleConfig;
use puzzlebox_hardware::mock::{MockSerialHandle, MockSerialLink};
use puzzlebox_hardware::{AnySerialLink, DeviceRegistry, HardwareError};
use tokio::time::Instant;

const CONFIG: &str = r#"
[serial]
settle_delay_ms = 3000

[session]
duration_secs = 60

[devices.engine-room]
port = "/dev/ttyACM0"

[devices.crypt-gears]

[devices.broken]
port = "/dev/ttyACM9"
"#;

/// Opener backed by mock links, failing for ports it does not know.
fn mock_opener(
    ports: &[&str],
) -> (
    impl FnMut(&str, &str, u32) -> puzzlebox_hardware::Result<AnySerialLink>,
    HashMap<String, MockSerialHandle>,
) {
    let mut links = HashMap::new();
    let mut handles = HashMap::new();
    for port in ports {
        let (link, handle) = MockSerialLink::with_name(*port);
        // Boot noise the flush must remove
        handle.send(b"garbage\r\n").unwrap();
        links.insert(port.to_string(), link);
        handles.insert(port.to_string(), handle);
    }

    let opener = move |_name: &str, port: &str, _baud: u32| {
        links
            .remove(port)
            .map(AnySerialLink::Mock)
            .ok_or_else(|| HardwareError::initialization_failed(format!("{port}: not found")))
    };
    (opener, handles)
}

#[tokio::test(start_paused = true)]
async fn test_initialize_opens_configured_ports() {
    let config = PuzzleConfig::from_toml_str(CONFIG).unwrap();
    let mut registry = DeviceRegistry::from_config(&config);
    let (opener, handles) = mock_opener(&["/dev/ttyACM0"]);

    let start = Instant::now();
    let connected = registry.initialize(config.serial.baud_rate, opener).await;

    assert_eq!(connected, 1);
    assert!(registry.is_connected("engine-room"));
    assert!(!registry.is_connected("crypt-gears"));
    assert!(!registry.is_connected("broken"));

    // Only the successful open waits for the board to boot
    assert_eq!(start.elapsed(), Duration::from_secs(3));

    let handle = &handles["/dev/ttyACM0"];
    assert_eq!(handle.flush_count(), 1);
    assert!(registry.poll_messages().is_empty());

    handle.send_line("10").unwrap();
    assert_eq!(
        registry.poll_messages(),
        vec![("engine-room".to_string(), "10".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_initialize_with_no_ports() {
    let mut registry = DeviceRegistry::new().with_settle_delay(Duration::from_secs(3));
    registry.add_device("crypt-gears", None);

    let start = Instant::now();
    let connected = registry
        .initialize(9600, |_, port, _| {
            Err(HardwareError::initialization_failed(port.to_string()))
        })
        .await;

    assert_eq!(connected, 0);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_baud_rate_passed_to_opener() {
    let mut registry = DeviceRegistry::new();
    registry.add_device("engine-room", Some("/dev/ttyACM0".into()));

    let mut seen = Vec::new();
    registry
        .initialize(115_200, |name, port, baud| {
            seen.push((name.to_string(), port.to_string(), baud));
            Err(HardwareError::initialization_failed("offline"))
        })
        .await;

    assert_eq!(
        seen,
        vec![(
            "engine-room".to_string(),
            "/dev/ttyACM0".to_string(),
            115_200
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_after_partial_initialize() {
    let config = PuzzleConfig::from_toml_str(CONFIG).unwrap();
    let mut registry = DeviceRegistry::from_config(&config);
    let (opener, _handles) = mock_opener(&["/dev/ttyACM0"]);
    registry.initialize(9600, opener).await;

    registry.shutdown();
    registry.shutdown();

    assert_eq!(registry.connected_count(), 0);
    assert_eq!(registry.device_names().len(), 3);
}
