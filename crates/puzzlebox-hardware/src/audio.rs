//! Audio output backends.
//!
//! - [`CommandPlayer`] spawns an external player (`aplay`, `paplay`, ...) per
//!   clip. This is the default and needs nothing but the player binary.
//! - [`NullAudio`] only logs; useful for dry runs on a laptop.
//! - `RodioPlayer` decodes and plays in-process (behind the `rodio` feature).

use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::traits::{AudioOutput, Playback};
use crate::{HardwareError, Result};

/// Plays each clip by spawning an external program.
///
/// The clip path is appended as the last argument.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Build a player from `[program, args...]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `command` is empty.
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| HardwareError::initialization_failed("audio command is empty"))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Program that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AudioOutput for CommandPlayer {
    type Playback = CommandPlayback;

    fn play(&mut self, path: &Path) -> Result<CommandPlayback> {
        if !path.is_file() {
            return Err(HardwareError::audio(format!(
                "clip file not found: {}",
                path.display()
            )));
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HardwareError::audio(format!("failed to spawn {}: {e}", self.program)))?;

        debug!("Spawned {} for {}", self.program, path.display());

        Ok(CommandPlayback { child, done: false })
    }
}

/// A running player process.
#[derive(Debug)]
pub struct CommandPlayback {
    child: Child,
    done: bool,
}

impl Playback for CommandPlayback {
    fn stop(&mut self) {
        if self.is_finished() {
            return;
        }
        match self.child.start_kill() {
            // Reap the player now if it has already gone
            Ok(()) => {
                if let Err(e) = self.child.try_wait() {
                    debug!("Failed to reap player process: {}", e);
                }
            }
            Err(e) => warn!("Failed to stop player process: {}", e),
        }
        self.done = true;
    }

    fn is_finished(&mut self) -> bool {
        if self.done {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    warn!("Player exited with {}", status);
                }
                self.done = true;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Lost track of player process: {}", e);
                self.done = true;
            }
        }
        self.done
    }
}

/// Audio output that only logs what it would play.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioOutput for NullAudio {
    type Playback = NullPlayback;

    fn play(&mut self, path: &Path) -> Result<NullPlayback> {
        info!("(silent) playing {}", path.display());
        Ok(NullPlayback)
    }
}

/// Playback from [`NullAudio`]; always finished.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayback;

impl Playback for NullPlayback {
    fn stop(&mut self) {}

    fn is_finished(&mut self) -> bool {
        true
    }
}

#[cfg(feature = "rodio")]
pub use self::rodio_backend::{RodioPlayback, RodioPlayer};

#[cfg(feature = "rodio")]
mod rodio_backend {
    use std::fmt;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use crate::traits::{AudioOutput, Playback};
    use crate::{HardwareError, Result};

    /// In-process playback on the default output device.
    pub struct RodioPlayer {
        // Dropping the stream silences every sink
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl RodioPlayer {
        /// Open the default output device.
        ///
        /// # Errors
        ///
        /// Returns an error if no output device is available.
        pub fn try_default() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| HardwareError::initialization_failed(format!("audio output: {e}")))?;
            debug!("Opened default audio output");
            Ok(Self {
                _stream: stream,
                handle,
            })
        }
    }

    impl AudioOutput for RodioPlayer {
        type Playback = RodioPlayback;

        fn play(&mut self, path: &Path) -> Result<RodioPlayback> {
            let file = File::open(path)
                .map_err(|e| HardwareError::audio(format!("{}: {e}", path.display())))?;
            let source = Decoder::new(BufReader::new(file))
                .map_err(|e| HardwareError::audio(format!("{}: {e}", path.display())))?;
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| HardwareError::audio(format!("sink: {e}")))?;
            sink.append(source);
            Ok(RodioPlayback { sink })
        }
    }

    impl fmt::Debug for RodioPlayer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("RodioPlayer").finish_non_exhaustive()
        }
    }

    /// One clip queued on its own sink.
    pub struct RodioPlayback {
        sink: Sink,
    }

    impl Playback for RodioPlayback {
        fn stop(&mut self) {
            self.sink.stop();
        }

        fn is_finished(&mut self) -> bool {
            self.sink.empty()
        }
    }

    impl fmt::Debug for RodioPlayback {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("RodioPlayback")
                .field("finished", &self.sink.empty())
                .finish()
        }
    }
}
