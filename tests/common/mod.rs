// Test doubles for the platform audio primitives.
//
// Each integration test binary pulls in only what it needs.
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use voice_journal::{AudioPlayer, AudioRecorder, EncoderSettings, PlayerCallback};

/// Write a silent mono 16-bit WAV of the given length.
pub fn write_wav(path: &Path, millis: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..(8 * millis) {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Wait until `rx` satisfies `pred`, failing after five seconds.
pub async fn wait_until<T>(rx: &mut watch::Receiver<T>, pred: impl FnMut(&T) -> bool) -> T
where
    T: Clone,
{
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed")
        .clone()
}

/// Let spawned callback tasks run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Shared view into what a [`FakeRecorder`] was asked to do.
#[derive(Clone, Default)]
pub struct RecorderLog {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub outputs: Arc<Mutex<Vec<PathBuf>>>,
    /// For each `start`, whether the watched playback was playing
    pub playing_at_start: Arc<Mutex<Vec<bool>>>,
    pub playback: Arc<Mutex<Option<watch::Receiver<voice_journal::PlaybackSessionState>>>>,
}

impl RecorderLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }

    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

/// Recorder that writes a short WAV on `start`.
pub struct FakeRecorder {
    log: RecorderLog,
    max_channels: u16,
    fail_start: bool,
}

impl FakeRecorder {
    pub fn new() -> (Self, RecorderLog) {
        let log = RecorderLog::default();
        (
            Self {
                log: log.clone(),
                max_channels: 2,
                fail_start: false,
            },
            log,
        )
    }

    pub fn mono_only(mut self) -> Self {
        self.max_channels = 1;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

impl AudioRecorder for FakeRecorder {
    fn configure(&mut self, settings: &EncoderSettings) -> Result<()> {
        self.log
            .push(format!("configure {}ch {}Hz", settings.channels, settings.sample_rate));
        if settings.channels > self.max_channels {
            bail!("{} channels unsupported", settings.channels);
        }
        Ok(())
    }

    fn start(&mut self, output: &Path) -> Result<()> {
        self.log.push("start");
        if let Some(rx) = self.log.playback.lock().unwrap().as_ref() {
            let playing = rx.borrow().is_playing;
            self.log.playing_at_start.lock().unwrap().push(playing);
        }
        if self.fail_start {
            bail!("microphone busy");
        }
        write_wav(output, 1_000)?;
        self.log.outputs.lock().unwrap().push(output.to_path_buf());
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.log.push("pause");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.log.push("resume");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.push("stop");
        Ok(())
    }

    fn name(&self) -> &str {
        "fake-recorder"
    }
}

/// Player driven by the test: callbacks fire only when the test says so.
#[derive(Default)]
pub struct FakePlayer {
    pub position_ms: AtomicU64,
    pub duration_ms: AtomicU64,
    pub position_fails: AtomicBool,
    /// Fire the prepared callback from inside `play_file`
    pub prepare_inline: AtomicBool,
    /// Reject every `play_file`
    pub fail_load: AtomicBool,
    playing: AtomicBool,
    calls: Mutex<Vec<String>>,
    on_prepared: Mutex<Option<PlayerCallback>>,
    on_complete: Mutex<Option<PlayerCallback>>,
}

impl FakePlayer {
    pub fn with_duration(duration_ms: u64) -> Arc<Self> {
        let player = Self::default();
        player.duration_ms.store(duration_ms, Ordering::SeqCst);
        Arc::new(player)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_position(&self, ms: u64) {
        self.position_ms.store(ms, Ordering::SeqCst);
    }

    pub fn fire_prepared(&self) {
        if let Some(callback) = self.on_prepared.lock().unwrap().as_ref() {
            callback();
        }
    }

    pub fn fire_complete(&self) {
        if let Some(callback) = self.on_complete.lock().unwrap().as_ref() {
            callback();
        }
    }

    /// Detach the current prepared callback, e.g. to fire it after a newer
    /// `play_file`.
    pub fn take_prepared(&self) -> Option<PlayerCallback> {
        self.on_prepared.lock().unwrap().take()
    }

    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl AudioPlayer for FakePlayer {
    fn play_file(&self, file: &Path) -> Result<()> {
        self.push(format!("play {}", file.display()));
        if self.fail_load.load(Ordering::SeqCst) {
            bail!("unsupported codec");
        }
        self.playing.store(true, Ordering::SeqCst);
        if self.prepare_inline.load(Ordering::SeqCst) {
            self.fire_prepared();
        }
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.push("pause");
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        self.push("resume");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.push("stop");
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.push(format!("seek {position_ms}"));
        self.position_ms.store(position_ms, Ordering::SeqCst);
        Ok(())
    }

    fn set_on_prepared(&self, callback: PlayerCallback) {
        *self.on_prepared.lock().unwrap() = Some(callback);
    }

    fn set_on_complete(&self, callback: PlayerCallback) {
        *self.on_complete.lock().unwrap() = Some(callback);
    }

    fn current_position_ms(&self) -> Result<u64> {
        if self.position_fails.load(Ordering::SeqCst) {
            bail!("player not ready");
        }
        Ok(self.position_ms.load(Ordering::SeqCst))
    }

    fn duration_ms(&self) -> Result<u64> {
        Ok(self.duration_ms.load(Ordering::SeqCst))
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}
