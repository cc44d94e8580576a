//! `puzzlebox check`: validate a deployment before opening the room.

use puzzlebox_core::PuzzleConfig;
use puzzlebox_protocol::CodeTable;

pub fn check(config: &PuzzleConfig) -> anyhow::Result<()> {
    config.validate(true)?;

    let table = CodeTable::from_config(&config.codes);
    println!("configuration version {}: OK", config.config_version);
    println!(
        "session: {}s, {} intro clips, {} warnings, outro {}",
        config.session.duration_secs,
        config.session.intro.len(),
        config.session.warnings.len(),
        config
            .session
            .outro
            .as_ref()
            .map_or("none".to_string(), ToString::to_string),
    );
    for (name, device) in &config.devices {
        println!(
            "device {}: {}",
            name,
            device.port.as_deref().unwrap_or("(no port)")
        );
    }
    println!("{} clips, {} codes", config.clips.len(), table.len());
    Ok(())
}
