//! Session coordinator
//!
//! Composes the two trackers, the filter engine and the storage/path
//! collaborators behind one handle:
//! - recording and playback are never active at the same time; starting one
//!   stops the other first
//! - every change to the entries, topics or any filter input recomputes the
//!   filtered projection in the same state update
//! - saving a recording copies it to durable storage, records the entry,
//!   then links topics best-effort
//! - user-visible failures go out once through the event channel

mod entries;
mod sessions;
mod state;

pub use state::{EntryDraft, JournalState, NowPlaying};

use futures::StreamExt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::audio::{AudioPlayer, AudioRecorder, DurationProbe, FileDurationProbe};
use crate::config::Config;
use crate::context::JournalContext;
use crate::events::{EventChannel, JournalEvent};
use crate::paths::{DirectoryPaths, FileNameProvider, PathProvider, TimestampFileNames};
use crate::session::{PlaybackSessionState, PlaybackTracker, RecordingSessionState, RecordingTracker};
use crate::store::JournalStore;

/// External collaborators the coordinator is built from.
pub struct Collaborators {
    pub recorder: Box<dyn AudioRecorder>,
    pub player: Arc<dyn AudioPlayer>,
    pub store: Arc<dyn JournalStore>,
    pub paths: Arc<dyn PathProvider>,
    pub names: Arc<dyn FileNameProvider>,
    pub probe: Arc<dyn DurationProbe>,
}

impl Collaborators {
    /// Directory paths and file names from `config`; WAV/symphonia probing.
    pub fn with_defaults(
        config: &Config,
        recorder: Box<dyn AudioRecorder>,
        player: Arc<dyn AudioPlayer>,
        store: Arc<dyn JournalStore>,
    ) -> Self {
        Self {
            recorder,
            player,
            store,
            paths: Arc::new(DirectoryPaths::from_config(&config.storage)),
            names: Arc::new(TimestampFileNames::from_config(&config.storage)),
            probe: Arc::new(FileDurationProbe),
        }
    }
}

pub struct JournalCoordinator {
    context: JournalContext,
    recording: RecordingTracker,
    playback: PlaybackTracker,
    store: Arc<dyn JournalStore>,
    paths: Arc<dyn PathProvider>,
    names: Arc<dyn FileNameProvider>,
    probe: Arc<dyn DurationProbe>,
    state: watch::Sender<JournalState>,
    events: EventChannel<JournalEvent>,
    /// Serialises session transitions; holds the file being recorded
    sessions: Mutex<Option<PathBuf>>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl JournalCoordinator {
    /// Build the coordinator and start following the store's live entry
    /// and topic streams.
    pub fn new(context: JournalContext, parts: Collaborators) -> Arc<Self> {
        let config = &context.config;
        let initial = JournalState {
            sort_order: config.journal.default_sort,
            ..JournalState::default()
        };
        let (state, _) = watch::channel(initial);

        let coordinator = Arc::new(Self {
            recording: RecordingTracker::new(&context, parts.recorder),
            playback: PlaybackTracker::new(&context, parts.player),
            events: EventChannel::buffered(config.journal.event_capacity),
            store: parts.store,
            paths: parts.paths,
            names: parts.names,
            probe: parts.probe,
            state,
            sessions: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            context,
        });
        coordinator.follow_store();
        coordinator
    }

    pub fn state(&self) -> JournalState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JournalState> {
        self.state.subscribe()
    }

    pub fn recording_state(&self) -> RecordingSessionState {
        self.recording.state()
    }

    pub fn subscribe_recording(&self) -> watch::Receiver<RecordingSessionState> {
        self.recording.subscribe()
    }

    pub fn playback_state(&self) -> PlaybackSessionState {
        self.playback.state()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackSessionState> {
        self.playback.subscribe()
    }

    pub fn events(&self) -> &EventChannel<JournalEvent> {
        &self.events
    }

    pub async fn next_event(&self) -> Option<JournalEvent> {
        self.events.next().await
    }

    /// Apply `change` and recompute the filtered projection in one update.
    fn mutate(&self, change: impl FnOnce(&mut JournalState)) {
        self.state.send_modify(|state| {
            change(state);
            state.refilter();
        });
    }

    fn sessions(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn follow_store(self: &Arc<Self>) {
        let mut entries = self.store.stream_entries();
        let weak = Arc::downgrade(self);
        let entries_task = self.context.runtime.spawn(async move {
            while let Some(list) = entries.next().await {
                let Some(this) = weak.upgrade() else { break };
                info!("Store delivered {} entries", list.len());
                this.mutate(|state| state.entries = list);
            }
        });

        let mut topics = self.store.stream_topics();
        let weak = Arc::downgrade(self);
        let topics_task = self.context.runtime.spawn(async move {
            while let Some(list) = topics.next().await {
                let Some(this) = weak.upgrade() else { break };
                this.mutate(|state| state.all_topics = list);
            }
        });

        let mut listeners = self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.push(entries_task);
        listeners.push(topics_task);
    }
}

impl Drop for JournalCoordinator {
    fn drop(&mut self) {
        let listeners = self.listeners.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        for task in listeners.drain(..) {
            task.abort();
        }
    }
}
