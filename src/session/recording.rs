use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::state::RecordingSessionState;
use super::worker::{Published, Worker};
use crate::audio::{negotiate_quality, AudioRecorder, RecordingQuality};
use crate::context::JournalContext;
use crate::timer::Timer;

/// Turns a raw [`AudioRecorder`] into an observable
/// `idle -> recording <-> paused -> idle` state machine.
///
/// Elapsed time is an accumulator of [`Timer`] deltas. The timer is
/// consumed only while recording and not paused; each flip of that
/// condition cancels or respawns the accumulation task.
pub struct RecordingTracker {
    published: Arc<Published<RecordingSessionState>>,
    control: Mutex<Control>,
    timer: Timer,
    quality: RecordingQuality,
    runtime: Handle,
}

struct Control {
    recorder: Box<dyn AudioRecorder>,
    ticker: Worker,
}

impl RecordingTracker {
    pub fn new(context: &JournalContext, recorder: Box<dyn AudioRecorder>) -> Self {
        let recording = &context.config.recording;
        Self::with_timer(
            context.runtime.clone(),
            recorder,
            Timer::new(recording.tick_interval()),
            recording.quality,
        )
    }

    pub fn with_timer(
        runtime: Handle,
        recorder: Box<dyn AudioRecorder>,
        timer: Timer,
        quality: RecordingQuality,
    ) -> Self {
        Self {
            published: Arc::new(Published::new(RecordingSessionState::default())),
            control: Mutex::new(Control {
                recorder,
                ticker: Worker::default(),
            }),
            timer,
            quality,
            runtime,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecordingSessionState> {
        self.published.subscribe()
    }

    pub fn state(&self) -> RecordingSessionState {
        self.published.snapshot()
    }

    /// Begin recording into `output`. No-op while already recording.
    ///
    /// Quality is negotiated first and never fails; an error here means the
    /// recorder could not start at all and the tracker stays idle.
    pub fn start(&self, output: &Path, reset_elapsed: bool) -> Result<()> {
        let mut control = self.control();
        if self.state().is_recording {
            warn!("Recording already started");
            return Ok(());
        }

        info!("Starting recording: {}", output.display());

        negotiate_quality(control.recorder.as_mut(), self.quality);
        control
            .recorder
            .start(output)
            .with_context(|| format!("Failed to start recorder for {}", output.display()))?;

        self.published.update(|state| {
            if reset_elapsed {
                state.elapsed = Duration::ZERO;
            }
            state.is_recording = true;
            state.is_paused = false;
        });
        self.sync_ticker(&mut control);

        Ok(())
    }

    pub fn pause(&self) {
        let mut control = self.control();
        let state = self.state();
        if !state.is_recording || state.is_paused {
            warn!("Pause ignored: not actively recording");
            return;
        }

        if let Err(e) = control.recorder.pause() {
            error!("Recorder failed to pause: {:#}", e);
        }

        self.stop_ticker(&mut control);
        self.published.update(|state| state.is_paused = true);
        info!("Recording paused at {:?}", self.state().elapsed);
    }

    pub fn resume(&self) {
        let mut control = self.control();
        let state = self.state();
        if !state.is_recording || !state.is_paused {
            warn!("Resume ignored: recording is not paused");
            return;
        }

        if let Err(e) = control.recorder.resume() {
            error!("Recorder failed to resume: {:#}", e);
        }

        self.published.update(|state| state.is_paused = false);
        self.sync_ticker(&mut control);
        info!("Recording resumed");
    }

    /// Stop and release the recorder. No-op while idle.
    pub fn stop(&self, reset_elapsed: bool) {
        let mut control = self.control();
        if !self.state().is_recording {
            warn!("Recording not active");
            return;
        }

        if let Err(e) = control.recorder.stop() {
            error!("Recorder failed to stop cleanly: {:#}", e);
        }

        self.stop_ticker(&mut control);
        self.published.update(|state| {
            state.is_recording = false;
            state.is_paused = false;
            if reset_elapsed {
                state.elapsed = Duration::ZERO;
            }
        });
        info!("Recording stopped");
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start the accumulation task if the published state is capturing and
    /// none is running.
    fn sync_ticker(&self, control: &mut Control) {
        if !self.state().is_capturing() || control.ticker.is_running() {
            return;
        }

        let generation = self.published.next_generation();
        let published = Arc::clone(&self.published);
        let ticks = self.timer.ticks();

        control.ticker.set(self.runtime.spawn(async move {
            futures::pin_mut!(ticks);
            while let Some(delta) = ticks.next().await {
                if !published.update_if_current(generation, |state| state.elapsed += delta) {
                    break;
                }
            }
        }));
    }

    /// Must run before the transition that ends capturing is published.
    fn stop_ticker(&self, control: &mut Control) {
        self.published.next_generation();
        control.ticker.cancel();
    }
}

impl Drop for RecordingTracker {
    fn drop(&mut self) {
        self.published.next_generation();
    }
}
