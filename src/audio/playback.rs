//! `AudioPlayer` trait and the rodio-backed implementation.
//!
//! rodio's `OutputStream` is not `Send`, so `RodioPlayer` keeps the output
//! device on a dedicated OS thread and talks to it over an mpsc channel.
//! The playing flag is an `AtomicBool` shared with that thread, so
//! `is_playing` never blocks on the device.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};

use crate::audio::wav::AudioError;

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Playback seam for the session controller.
///
/// Implementors must be `Send + Sync` so the controller can hold the player
/// as `Arc<dyn AudioPlayer>` and poll it from a watcher task.
pub trait AudioPlayer: Send + Sync {
    /// Start playing a WAV byte buffer, stopping any clip already playing.
    fn play(&self, wav: Vec<u8>) -> Result<(), AudioError>;

    /// Stop playback immediately.  A no-op when nothing is playing.
    fn stop(&self);

    /// Whether a clip is currently playing.
    fn is_playing(&self) -> bool;
}

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

enum PlayerCommand {
    Play(Vec<u8>),
    Stop,
}

/// Owns the output device on a background thread.
///
/// Dropping the player closes the command channel, which shuts the thread
/// down and releases the device.
pub struct RodioPlayer {
    tx: mpsc::Sender<PlayerCommand>,
    playing: Arc<AtomicBool>,
    device_failed: Arc<AtomicBool>,
}

impl RodioPlayer {
    /// Spawn the playback thread and open the default output device on it.
    ///
    /// Waits for the device-open outcome before returning, so a missing
    /// device is known here and every later `play` fails loudly instead of
    /// playing silence.
    pub fn spawn() -> Result<Self, AudioError> {
        let (tx, rx) = mpsc::channel::<PlayerCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let playing = Arc::new(AtomicBool::new(false));
        let device_failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&playing);
        let failed = Arc::clone(&device_failed);

        std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || playback_loop(rx, flag, failed, ready_tx))
            .map_err(|e| AudioError::Playback(e.to_string()))?;

        // The thread signals once the device open was attempted.
        let _ = ready_rx.recv();

        Ok(Self {
            tx,
            playing,
            device_failed,
        })
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, wav: Vec<u8>) -> Result<(), AudioError> {
        if self.device_failed.load(Ordering::SeqCst) {
            return Err(AudioError::Playback("no output device available".into()));
        }
        // Optimistically mark playing so a watcher spawned right after play()
        // observes the clip even before the device thread picks it up.
        self.playing.store(true, Ordering::SeqCst);
        self.tx.send(PlayerCommand::Play(wav)).map_err(|_| {
            self.playing.store(false, Ordering::SeqCst);
            AudioError::Playback("playback thread is gone".into())
        })
    }

    fn stop(&self) {
        let _ = self.tx.send(PlayerCommand::Stop);
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Device-thread loop: handle commands, watch for natural end of playback.
fn playback_loop(
    rx: mpsc::Receiver<PlayerCommand>,
    playing: Arc<AtomicBool>,
    device_failed: Arc<AtomicBool>,
    ready_tx: mpsc::Sender<()>,
) {
    let Ok((_stream, handle)) = OutputStream::try_default() else {
        log::error!("audio: no output device available, narration disabled");
        device_failed.store(true, Ordering::SeqCst);
        playing.store(false, Ordering::SeqCst);
        let _ = ready_tx.send(());
        // Drain commands so senders never block.  No command should arrive
        // since `play` checks the failed flag, but the channel stays open.
        while let Ok(cmd) = rx.recv() {
            if let PlayerCommand::Play(_) = cmd {
                playing.store(false, Ordering::SeqCst);
            }
        }
        return;
    };
    let _ = ready_tx.send(());

    let mut sink: Option<Sink> = None;

    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(PlayerCommand::Play(wav)) => {
                // A new clip invalidates whatever was playing.
                if let Some(old) = sink.take() {
                    old.stop();
                }
                match Sink::try_new(&handle) {
                    Ok(new_sink) => match Decoder::new(Cursor::new(wav)) {
                        Ok(source) => {
                            new_sink.append(source);
                            playing.store(true, Ordering::SeqCst);
                            sink = Some(new_sink);
                        }
                        Err(e) => {
                            log::error!("audio: undecodable clip: {e}");
                            playing.store(false, Ordering::SeqCst);
                        }
                    },
                    Err(e) => {
                        log::error!("audio: failed to open sink: {e}");
                        playing.store(false, Ordering::SeqCst);
                    }
                }
            }
            Ok(PlayerCommand::Stop) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                playing.store(false, Ordering::SeqCst);
            }
            Err(RecvTimeoutError::Timeout) => {
                // Natural end of playback clears the flag.
                if sink.as_ref().is_some_and(|s| s.empty()) {
                    sink = None;
                    playing.store(false, Ordering::SeqCst);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("audio: playback thread shutting down");
}

// ---------------------------------------------------------------------------
// MockPlayer (test-only, shared with the session test suite)
// ---------------------------------------------------------------------------

/// In-memory player used across the crate's test suites.
#[cfg(test)]
pub(crate) struct MockPlayer {
    playing: AtomicBool,
    pub(crate) plays: std::sync::atomic::AtomicU32,
    pub(crate) stops: std::sync::atomic::AtomicU32,
    pub(crate) last_wav: std::sync::Mutex<Option<Vec<u8>>>,
}

#[cfg(test)]
impl MockPlayer {
    pub(crate) fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
            plays: std::sync::atomic::AtomicU32::new(0),
            stops: std::sync::atomic::AtomicU32::new(0),
            last_wav: std::sync::Mutex::new(None),
        }
    }

    /// Simulate the clip reaching its natural end.
    pub(crate) fn finish(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl AudioPlayer for MockPlayer {
    fn play(&self, wav: Vec<u8>) -> Result<(), AudioError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        *self.last_wav.lock().unwrap() = Some(wav);
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
