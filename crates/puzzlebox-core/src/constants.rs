//! Shared constants for the puzzle room controller.
//!
//! These values describe the serial line protocol spoken by the room's
//! microcontroller boards and the default timing of the control loop. Every
//! timing default can be overridden in the deployment configuration file.
//!
//! # Line Protocol
//!
//! Boards emit plain ASCII text, one message per line:
//!
//! ```text
//! 20\n
//! 19\r\n
//! ```
//!
//! Either `\n` or `\r` terminates a message. Empty lines (for example the
//! second terminator of a `\r\n` pair) are suppressed by the framer.

// ============================================================================
// Line Protocol
// ============================================================================

/// Line feed terminator (`\n`).
pub const LINE_FEED: u8 = b'\n';

/// Carriage return terminator (`\r`).
pub const CARRIAGE_RETURN: u8 = b'\r';

/// Maximum length of a single line before the framer discards it.
///
/// Boards send short numeric codes; a line this long means the stream is
/// garbage (wrong baud rate, electrical noise).
pub const MAX_LINE_LENGTH: usize = 256;

// ============================================================================
// Serial Defaults
// ============================================================================

/// Default baud rate shared by all boards.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default delay after opening a port before the board is considered ready.
///
/// Opening the port resets an Arduino-class board; it needs a few seconds to
/// boot before it starts emitting messages.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 3000;

// ============================================================================
// Control Loop Defaults
// ============================================================================

/// Default interval between two ticks of the control loop.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Default sub-wait used while waiting for a cue to finish.
pub const DEFAULT_CUE_POLL_INTERVAL_MS: u64 = 20;

/// Default total session length (20 minutes).
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 1200;

// ============================================================================
// Code Tables
// ============================================================================

/// Name of the code table that applies to every device without its own entry.
pub const DEFAULT_CODE_TABLE: &str = "default";

/// Default external command used to play a clip file.
pub const DEFAULT_PLAYER_COMMAND: &[&str] = &["aplay", "-q"];

/// Current configuration schema version.
pub const CONFIG_VERSION: &str = "1";
