use futures::StreamExt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::{PlaybackPhase, PlaybackSessionState};
use super::worker::{Published, Worker};
use crate::audio::{AudioPlayer, PlayerCallback};
use crate::context::JournalContext;
use crate::timer::Timer;

/// Turns a raw [`AudioPlayer`] into an observable
/// `idle -> preparing -> playing <-> paused -> idle` state machine.
///
/// `play_file` only starts the load; the tracker reports playing once the
/// player's prepared callback arrives. Player callbacks are re-dispatched
/// onto the runtime, so a player may fire them from any thread, including
/// from inside its own `play_file`.
pub struct PlaybackTracker {
    core: Arc<Core>,
}

struct Core {
    player: Arc<dyn AudioPlayer>,
    published: Arc<Published<PlaybackSessionState>>,
    control: Mutex<Control>,
    timer: Timer,
    runtime: Handle,
}

#[derive(Default)]
struct Control {
    /// Identifies the current `play_file` call; callbacks carrying an older
    /// value are ignored
    session: u64,
    preparing: bool,
    poller: Worker,
}

impl PlaybackTracker {
    pub fn new(context: &JournalContext, player: Arc<dyn AudioPlayer>) -> Self {
        Self::with_timer(
            context.runtime.clone(),
            player,
            Timer::new(context.config.playback.poll_interval()),
        )
    }

    pub fn with_timer(runtime: Handle, player: Arc<dyn AudioPlayer>, timer: Timer) -> Self {
        Self {
            core: Arc::new(Core {
                player,
                published: Arc::new(Published::new(PlaybackSessionState::default())),
                control: Mutex::new(Control::default()),
                timer,
                runtime,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSessionState> {
        self.core.published.subscribe()
    }

    pub fn state(&self) -> PlaybackSessionState {
        self.core.published.snapshot()
    }

    pub fn phase(&self) -> PlaybackPhase {
        let control = self.core.control();
        let state = self.state();
        match (control.preparing, state.is_playing, state.is_paused) {
            (true, _, _) => PlaybackPhase::Preparing,
            (false, true, true) => PlaybackPhase::Paused,
            (false, true, false) => PlaybackPhase::Playing,
            (false, false, _) => PlaybackPhase::Idle,
        }
    }

    /// Any phase other than idle.
    pub fn is_active(&self) -> bool {
        self.phase() != PlaybackPhase::Idle
    }

    /// Tear down the current session and start loading `file`.
    ///
    /// Returns before the file is playing; observe the state for
    /// `is_playing`. Returns false when the player refused the load, in
    /// which case the tracker stays idle.
    pub fn play_file(&self, file: &Path) -> bool {
        let core = &self.core;
        let mut control = core.control();
        core.stop_locked(&mut control);

        control.session += 1;
        control.preparing = true;
        let session = control.session;

        info!("Loading {} (session {})", file.display(), session);

        core.player.set_on_complete(core.callback(session, Core::handle_complete));
        core.player.set_on_prepared(core.callback(session, Core::handle_prepared));

        if let Err(e) = core.player.play_file(file) {
            error!("Player failed to load {}: {:#}", file.display(), e);
            control.session += 1;
            control.preparing = false;
            return false;
        }
        true
    }

    pub fn pause(&self) {
        let core = &self.core;
        let mut control = core.control();
        let state = self.state();
        if !state.is_playing || state.is_paused {
            warn!("Pause ignored: not playing");
            return;
        }

        if let Err(e) = core.player.pause() {
            error!("Player failed to pause: {:#}", e);
        }

        core.stop_poller(&mut control);
        core.published.update(|state| state.is_paused = true);
    }

    pub fn resume(&self) {
        let core = &self.core;
        let mut control = core.control();
        let state = self.state();
        if !state.is_playing || !state.is_paused {
            warn!("Resume ignored: playback is not paused");
            return;
        }

        if let Err(e) = core.player.resume() {
            error!("Player failed to resume: {:#}", e);
        }

        core.published.update(|state| state.is_paused = false);
        core.start_poller(&mut control);
    }

    /// Seek and publish the requested position immediately, without waiting
    /// for the next poll.
    ///
    /// Forwarded while preparing, playing or paused. Idle has no loaded file
    /// to seek in, so the call is dropped there and the position stays zero.
    pub fn seek_to(&self, position_ms: u64) {
        let core = &self.core;
        let control = core.control();
        if !control.preparing && !self.state().is_playing {
            debug!("Seek ignored: nothing loaded");
            return;
        }

        if let Err(e) = core.player.seek_to(position_ms) {
            error!("Player failed to seek to {} ms: {:#}", position_ms, e);
        }
        core.published
            .update(|state| state.position = Duration::from_millis(position_ms));
    }

    /// Release the player and return to idle. Position resets to zero; the
    /// last known duration is kept.
    pub fn stop(&self) {
        let core = &self.core;
        let mut control = core.control();
        core.stop_locked(&mut control);
    }
}

impl Drop for PlaybackTracker {
    fn drop(&mut self) {
        let mut control = self.core.control();
        control.session += 1;
        self.core.stop_poller(&mut control);
    }
}

impl Core {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wrap a handler as a player callback bound to `session`.
    fn callback(self: &Arc<Self>, session: u64, handler: fn(&Core, u64)) -> PlayerCallback {
        let weak: Weak<Core> = Arc::downgrade(self);
        let runtime = self.runtime.clone();
        Box::new(move || {
            let weak = weak.clone();
            runtime.spawn(async move {
                if let Some(core) = weak.upgrade() {
                    handler(&core, session);
                }
            });
        })
    }

    fn handle_prepared(&self, session: u64) {
        let mut control = self.control();
        if control.session != session || !control.preparing {
            debug!("Ignoring prepared callback from stale session {}", session);
            return;
        }
        control.preparing = false;

        let duration_ms = self.player.duration_ms().unwrap_or_else(|e| {
            debug!("Duration unavailable after prepare: {:#}", e);
            0
        });

        self.published.update(|state| {
            state.is_playing = true;
            state.is_paused = false;
            state.duration = Duration::from_millis(duration_ms);
        });
        self.start_poller(&mut control);
        info!("Playback started ({} ms)", duration_ms);
    }

    fn handle_complete(&self, session: u64) {
        let mut control = self.control();
        if control.session != session {
            debug!("Ignoring completion from stale session {}", session);
            return;
        }
        info!("Playback reached the end");
        self.stop_locked(&mut control);
    }

    fn stop_locked(&self, control: &mut Control) {
        let state = self.published.snapshot();
        if !state.is_playing && !control.preparing {
            return;
        }

        control.session += 1;
        control.preparing = false;
        self.stop_poller(control);

        if let Err(e) = self.player.stop() {
            error!("Player failed to stop cleanly: {:#}", e);
        }

        self.published.update(|state| {
            state.is_playing = false;
            state.is_paused = false;
            state.position = Duration::ZERO;
        });
        info!("Playback stopped");
    }

    fn start_poller(&self, control: &mut Control) {
        if !self.published.snapshot().is_advancing() || control.poller.is_running() {
            return;
        }

        let generation = self.published.next_generation();
        let published = Arc::clone(&self.published);
        let player = Arc::clone(&self.player);
        let ticks = self.timer.ticks();

        control.poller.set(self.runtime.spawn(async move {
            futures::pin_mut!(ticks);
            loop {
                // Sampled fresh on every pass, so a restart cannot drift
                let position_ms = player.current_position_ms().unwrap_or_else(|e| {
                    debug!("Position unavailable: {:#}", e);
                    0
                });
                let live = published.update_if_current(generation, |state| {
                    state.position = Duration::from_millis(position_ms);
                });
                if !live || ticks.next().await.is_none() {
                    break;
                }
            }
        }));
    }

    fn stop_poller(&self, control: &mut Control) {
        self.published.next_generation();
        control.poller.cancel();
    }
}
