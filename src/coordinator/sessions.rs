use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use super::state::{EntryDraft, NowPlaying};
use super::JournalCoordinator;
use crate::error::UserError;
use crate::events::JournalEvent;
use crate::model::EntryId;
use crate::paths::StorageLocation;

impl JournalCoordinator {
    /// Start a new recording into a fresh cache file, stopping any playback
    /// first. An unsaved draft from an earlier recording is discarded.
    pub fn start_recording(&self) {
        let mut active = self.sessions();
        if self.recording.state().is_recording {
            warn!("Recording already in progress");
            return;
        }

        if self.playback.is_active() {
            info!("Stopping playback before recording");
            self.halt_playback();
        }

        let file = match self.new_cache_file() {
            Ok(file) => file,
            Err(e) => {
                error!("No writable cache location: {:#}", e);
                self.events.emit(JournalEvent::Error(UserError::RecordingUnavailable));
                return;
            }
        };

        if let Err(e) = self.recording.start(&file, true) {
            error!("Failed to start recording: {:#}", e);
            self.events.emit(JournalEvent::Error(UserError::RecordingUnavailable));
            return;
        }

        if let Some(draft) = self.state.borrow().draft.as_ref() {
            info!("Discarding unsaved recording {}", draft.file.display());
            discard_file(&draft.file);
        }
        self.mutate(|state| state.draft = None);
        *active = Some(file);
    }

    pub fn pause_recording(&self) {
        let _active = self.sessions();
        self.recording.pause();
    }

    pub fn resume_recording(&self) {
        let _active = self.sessions();
        self.recording.resume();
    }

    /// Stop recording and keep the file as the pending draft.
    pub fn finish_recording(&self) -> Option<PathBuf> {
        let mut active = self.sessions();
        let Some(file) = active.take() else {
            warn!("Finish ignored: not recording");
            return None;
        };

        self.recording.stop(false);
        let elapsed = self.recording.state().elapsed;
        info!("Recording finished: {} ({:?})", file.display(), elapsed);

        self.mutate(|state| state.draft = Some(EntryDraft::new(file.clone(), elapsed)));
        self.events.emit(JournalEvent::RecordingFinished {
            file: file.clone(),
            elapsed,
        });
        Some(file)
    }

    /// Stop recording and delete what was captured.
    pub fn cancel_recording(&self) {
        let mut active = self.sessions();
        self.abandon_recording(&mut active);
    }

    /// Play a saved entry, stopping any recording first.
    pub fn play_entry(&self, id: EntryId) {
        let Some(item) = self.state.borrow().entry(id).cloned() else {
            warn!("Cannot play unknown entry {}", id);
            return;
        };

        self.play(NowPlaying {
            entry_id: Some(id),
            file: item.entry.file_path,
            duration_ms: item.entry.duration_ms,
        });
    }

    /// Play back the finished-but-unsaved recording.
    pub fn play_draft(&self) {
        let Some(draft) = self.state.borrow().draft.clone() else {
            warn!("No recording to play back");
            return;
        };

        self.play(NowPlaying {
            entry_id: None,
            file: draft.file,
            duration_ms: None,
        });
    }

    pub fn pause_playback(&self) {
        let _active = self.sessions();
        self.playback.pause();
    }

    pub fn resume_playback(&self) {
        let _active = self.sessions();
        self.playback.resume();
    }

    pub fn seek_playback(&self, position_ms: u64) {
        let _active = self.sessions();
        self.playback.seek_to(position_ms);
    }

    pub fn stop_playback(&self) {
        let _active = self.sessions();
        self.halt_playback();
    }

    /// Length to show for the current playback: the stored duration when
    /// the entry has one, otherwise what the player reported.
    pub fn display_duration(&self) -> Duration {
        self.state
            .borrow()
            .now_playing
            .as_ref()
            .and_then(|playing| playing.duration_ms)
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.playback.state().duration)
    }

    fn play(&self, target: NowPlaying) {
        let mut active = self.sessions();

        if !target.file.exists() {
            warn!("Audio file missing: {}", target.file.display());
            self.events.emit(JournalEvent::Error(UserError::AudioFileMissing));
            return;
        }

        if self.recording.state().is_recording {
            info!("Cancelling recording before playback");
            self.abandon_recording(&mut active);
        }

        if !self.playback.play_file(&target.file) {
            self.mutate(|state| state.now_playing = None);
            self.events.emit(JournalEvent::Error(UserError::PlaybackFailed));
            return;
        }
        self.mutate(|state| state.now_playing = Some(target));
    }

    /// Stop playback without taking the session lock.
    pub(super) fn halt_playback(&self) {
        self.playback.stop();
        self.mutate(|state| state.now_playing = None);
    }

    fn abandon_recording(&self, active: &mut Option<PathBuf>) {
        self.recording.stop(true);
        if let Some(file) = active.take() {
            info!("Recording cancelled, removing {}", file.display());
            discard_file(&file);
        }
    }

    fn new_cache_file(&self) -> Result<PathBuf> {
        let dir = self.paths.dir(StorageLocation::Cache)?;
        Ok(dir.join(self.names.new_audio_file_name()))
    }
}

/// Best-effort delete; a file that is already gone is fine.
pub(super) fn discard_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
    }
}
