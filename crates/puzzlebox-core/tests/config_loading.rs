//! Integration tests for loading configuration files from disk.

use std::fs;
use std::path::PathBuf;

use puzzlebox_core::{ClipId, ConfigError, PuzzleConfig};
use rstest::rstest;

fn write_config(dir: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("room.toml");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_load_resolves_clips_next_to_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sounds")).unwrap();
    fs::write(dir.path().join("sounds/intro.wav"), b"RIFF").unwrap();

    let path = write_config(
        &dir,
        r#"
        [session]
        duration_secs = 600
        intro = ["intro"]

        [clips]
        intro = "sounds/intro.wav"
        "#,
    );

    let config = PuzzleConfig::load(&path).unwrap();

    assert_eq!(
        config.clips[&ClipId::new("intro")],
        dir.path().join("sounds/intro.wav")
    );
    assert!(config.validate(true).is_ok());
}

#[test]
fn test_load_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = PuzzleConfig::load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[rstest]
#[case::not_toml("this is not toml")]
#[case::missing_session("log_level = \"info\"")]
#[case::bad_action("[session]\n[codes.default]\n\"1\" = { action = \"dance\" }")]
fn test_load_rejects_malformed_files(#[case] text: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, text);

    assert!(matches!(
        PuzzleConfig::load(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_load_rejects_dangling_clip_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [session]
        [codes.default]
        "10" = { action = "play", clip = "lightsound0" }
        "#,
    );

    assert!(matches!(
        PuzzleConfig::load(&path),
        Err(ConfigError::UnknownClip { .. })
    ));
}

#[test]
fn test_shipped_example_config_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/engine-room.toml");

    let config = PuzzleConfig::load(&path).unwrap();

    assert!(config.devices.contains_key("engine-room"));
    assert_eq!(config.session.warnings.len(), 4);
}
