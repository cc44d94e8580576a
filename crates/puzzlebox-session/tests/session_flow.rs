//! End-to-end session tests against mock boards and mock audio.
//!
//! All tests run under a paused tokio clock, so a twenty-minute session
//! completes instantly while keeping exact timings.

use std::path::PathBuf;
use std::time::Duration;

use puzzlebox_core::PuzzleConfig;
use puzzlebox_hardware::DeviceRegistry;
use puzzlebox_hardware::mock::{
    AudioEvent, MockAudio, MockAudioHandle, MockSerialHandle, MockSerialLink,
};
use puzzlebox_session::{SessionController, SessionOutcome, SessionPhase};
use tokio::time::{Instant, sleep};

const ROOM: &str = r#"
config_version = "1"

[timing]
tick_interval_ms = 10
cue_poll_interval_ms = 20

[session]
duration_secs = 1200
intro = ["intro1", "intro2"]
outro = "outro"
warnings = [
    { remaining_secs = 985, clip = "timewarning0" },
    { remaining_secs = 552, clip = "timewarning1" },
    { remaining_secs = 284, clip = "timewarning2" },
    { remaining_secs = 128, clip = "timewarning3" },
]

[audio]
backend = "null"

[devices.engine-room]

[clips]
intro1 = "intro1.wav"
intro2 = "intro2.wav"
outro = "outro.wav"
timewarning0 = "timewarning0.wav"
timewarning1 = "timewarning1.wav"
timewarning2 = "timewarning2.wav"
timewarning3 = "timewarning3.wav"
lightsound0 = "lightsound0.wav"
gearsound1 = "gearsound1.wav"
doom2 = "doom2.wav"

[codes.default]
"5" = { action = "one_shot", flag = "doom2", clip = "doom2" }

[codes.engine-room]
"10" = { action = "play", clip = "lightsound0" }
"19" = { action = "stop" }
"20" = { action = "solved", clip = "gearsound1" }
"#;

const BARE_ROOM: &str = r#"
[session]
duration_secs = 30
outro = "outro"
warnings = [{ remaining_secs = 10, clip = "hurry" }]

[audio]
backend = "null"

[clips]
outro = "outro.wav"
hurry = "hurry.wav"
"#;

struct Room {
    controller: SessionController<MockAudio>,
    board: MockSerialHandle,
    audio: MockAudioHandle,
}

fn room(config_text: &str) -> Room {
    let config = PuzzleConfig::from_toml_str(config_text).unwrap();
    config.validate(false).unwrap();

    let mut registry = DeviceRegistry::from_config(&config);
    let (link, board) = MockSerialLink::with_name("engine-room");
    registry.attach("engine-room", link.into()).unwrap();

    let (audio, audio_handle) = MockAudio::new();
    audio_handle.set_default_duration(Duration::from_secs(1));

    Room {
        controller: SessionController::from_config(&config, registry, audio),
        board,
        audio: audio_handle,
    }
}

fn started(audio: &MockAudioHandle, file: &str) -> usize {
    audio
        .started()
        .iter()
        .filter(|path| path.as_path() == std::path::Path::new(file))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_light_then_stop_then_solve() {
    let mut room = room(ROOM);
    room.audio
        .set_duration("lightsound0.wav", Duration::from_secs(30));
    room.audio.set_duration("gearsound1.wav", Duration::from_secs(3));

    let board = room.board.clone();
    let players = async move {
        // Intro takes two seconds
        sleep(Duration::from_secs(5)).await;
        board.send_line("10").unwrap();
        sleep(Duration::from_secs(1)).await;
        board.send_line("19").unwrap();
        sleep(Duration::from_secs(1)).await;
        board.send_line("20").unwrap();
    };

    let (report, ()) = tokio::join!(room.controller.run_session(), players);
    let report = report.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Solved);
    assert_eq!(report.messages_handled, 3);
    assert_eq!(report.warnings_fired, 0);

    let file = |name: &str| PathBuf::from(format!("{name}.wav"));
    assert_eq!(
        room.audio.events(),
        vec![
            AudioEvent::Started(file("intro1")),
            AudioEvent::Started(file("intro2")),
            AudioEvent::Started(file("lightsound0")),
            AudioEvent::Stopped(file("lightsound0")),
            AudioEvent::Started(file("gearsound1")),
        ]
    );

    let phases: Vec<SessionPhase> = room
        .controller
        .machine()
        .history()
        .iter()
        .map(|t| t.to)
        .collect();
    assert_eq!(
        phases,
        vec![
            SessionPhase::Intro,
            SessionPhase::Active,
            SessionPhase::Solved,
            SessionPhase::Idle
        ]
    );
    assert_eq!(room.controller.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_solved_session_fires_no_later_warnings() {
    let mut room = room(ROOM);

    let board = room.board.clone();
    let players = async move {
        sleep(Duration::from_secs(10)).await;
        board.send_line("20").unwrap();
    };

    let (report, ()) = tokio::join!(room.controller.run_session(), players);
    assert_eq!(report.unwrap().outcome, SessionOutcome::Solved);

    // Well past every deadline
    sleep(Duration::from_secs(1300)).await;
    assert_eq!(started(&room.audio, "timewarning0.wav"), 0);
    assert_eq!(started(&room.audio, "outro.wav"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_one_shot_resets_between_sessions() {
    let mut room = room(ROOM);

    for _ in 0..2 {
        let board = room.board.clone();
        let players = async move {
            sleep(Duration::from_secs(5)).await;
            board.send_line("5").unwrap();
            board.send_line("5").unwrap();
            sleep(Duration::from_secs(5)).await;
            board.send_line("5").unwrap();
            board.send_line("20").unwrap();
        };

        let (report, ()) = tokio::join!(room.controller.run_session(), players);
        let report = report.unwrap();
        assert_eq!(report.outcome, SessionOutcome::Solved);
        assert_eq!(report.messages_handled, 4);
    }

    assert_eq!(started(&room.audio, "doom2.wav"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_messages_discarded_before_active() {
    let mut room = room(&ROOM.replace("duration_secs = 1200", "duration_secs = 60"));

    // Left over from the previous group; would solve the room instantly
    room.board.send_line("20").unwrap();
    room.board.send(b"1").unwrap();

    let report = room.controller.run_session().await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::TimedOut);
    assert_eq!(report.stale_discarded, 1);
    assert_eq!(report.messages_handled, 0);
    assert_eq!(room.board.flush_count(), 1);
    assert_eq!(started(&room.audio, "gearsound1.wav"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_warnings_fire_on_schedule_then_outro() {
    let mut room = room(ROOM);
    room.audio.set_default_duration(Duration::from_millis(500));

    let start = Instant::now();
    let report = room.controller.run_session().await.unwrap();

    // Two intro clips of half a second each
    let active_at = start + Duration::from_secs(1);

    let warning_offsets: Vec<Duration> = room
        .audio
        .records()
        .into_iter()
        .filter_map(|record| match record.event {
            AudioEvent::Started(path) if path.to_string_lossy().starts_with("timewarning") => {
                Some(record.at - active_at)
            }
            _ => None,
        })
        .collect();

    assert_eq!(warning_offsets.len(), 4);
    for (offset, expected_secs) in warning_offsets.iter().zip([215, 648, 916, 1072]) {
        let expected = Duration::from_secs(expected_secs);
        assert!(*offset >= expected, "{offset:?} fired before {expected:?}");
        assert!(
            *offset < expected + Duration::from_millis(100),
            "{offset:?} fired late for {expected:?}"
        );
    }

    assert_eq!(report.outcome, SessionOutcome::TimedOut);
    assert_eq!(report.warnings_fired, 4);
    assert!(report.elapsed >= Duration::from_secs(1200));
    assert!(report.elapsed < Duration::from_secs(1201));

    let events = room.audio.events();
    assert_eq!(
        events.last(),
        Some(&AudioEvent::Started(PathBuf::from("outro.wav")))
    );
    assert_eq!(room.controller.phase(), SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_session_without_devices_still_times_out() {
    let config = PuzzleConfig::from_toml_str(BARE_ROOM).unwrap();
    config.validate(false).unwrap();
    let (audio, audio_handle) = MockAudio::new();
    let mut controller =
        SessionController::from_config(&config, DeviceRegistry::from_config(&config), audio);

    let start = Instant::now();
    let report = controller.run_session().await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::TimedOut);
    assert_eq!(report.warnings_fired, 1);
    assert!(controller.registry().is_empty());
    assert_eq!(started(&audio_handle, "hurry.wav"), 1);
    assert_eq!(started(&audio_handle, "outro.wav"), 1);
    // 30s session plus the outro
    assert!(start.elapsed() >= Duration::from_secs(31));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_boards() {
    let mut room = room(ROOM);

    room.controller.shutdown();

    assert!(room.board.send_line("10").is_err());
    assert_eq!(room.controller.registry().connected_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_session_returns_to_idle_on_shutdown() {
    let mut room = room(ROOM);
    room.audio
        .set_duration("lightsound0.wav", Duration::from_secs(600));

    let board = room.board.clone();
    let players = async move {
        sleep(Duration::from_secs(5)).await;
        board.send_line("10").unwrap();
    };

    // The operator quits while the room is still running
    let (interrupted, ()) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(60), room.controller.run_session()),
        players
    );
    assert!(interrupted.is_err());
    assert_eq!(room.controller.phase(), SessionPhase::Active);

    room.controller.shutdown();

    assert_eq!(room.controller.phase(), SessionPhase::Idle);
    let last = room.controller.machine().history().back().unwrap();
    assert_eq!(last.from, SessionPhase::Active);
    assert_eq!(
        room.audio.stopped(),
        vec![PathBuf::from("lightsound0.wav")]
    );
}
