use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::sessions::discard_file;
use super::state::{toggle, EntryDraft};
use super::JournalCoordinator;
use crate::error::UserError;
use crate::events::JournalEvent;
use crate::filter::SortOrder;
use crate::model::{AudioEntry, EntryId, Mood, Topic};
use crate::paths::StorageLocation;

impl JournalCoordinator {
    pub fn toggle_mood(&self, mood: Mood) {
        self.mutate(|state| toggle(&mut state.selected_moods, mood));
    }

    pub fn toggle_topic(&self, topic: Topic) {
        self.mutate(|state| toggle(&mut state.selected_topics, topic));
    }

    pub fn clear_mood_filter(&self) {
        self.mutate(|state| state.selected_moods.clear());
    }

    /// Narrow the topic suggestions to names containing `query`.
    pub fn set_topic_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.mutate(|state| state.topic_query = query);
    }

    pub fn clear_topic_filter(&self) {
        self.mutate(|state| state.selected_topics.clear());
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.mutate(|state| state.query = query);
    }

    /// Inclusive bounds on creation time, epoch milliseconds.
    pub fn set_date_range(&self, from_millis: Option<i64>, to_millis: Option<i64>) {
        self.mutate(|state| {
            state.from_millis = from_millis;
            state.to_millis = to_millis;
        });
    }

    pub fn set_sort_order(&self, sort: SortOrder) {
        self.mutate(|state| state.sort_order = sort);
    }

    pub fn set_draft_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.edit_draft(|draft| draft.title = title);
    }

    pub fn set_draft_mood(&self, mood: Option<Mood>) {
        self.edit_draft(|draft| draft.mood = mood);
    }

    pub fn set_draft_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.edit_draft(|draft| draft.description = description);
    }

    pub fn set_draft_transcription(&self, transcription: impl Into<String>) {
        let transcription = transcription.into();
        self.edit_draft(|draft| draft.transcription = transcription);
    }

    pub fn toggle_draft_topic(&self, topic: Topic) {
        self.edit_draft(|draft| toggle(&mut draft.topics, topic));
    }

    /// Create a topic and add it to the filter selection.
    pub async fn create_topic(&self, name: &str) -> Option<Topic> {
        let topic = self.insert_topic(name).await?;
        let selected = topic.clone();
        self.mutate(|state| {
            if !state.selected_topics.iter().any(|t| t.id == selected.id) {
                state.selected_topics.push(selected);
            }
        });
        Some(topic)
    }

    /// Create a topic and attach it to the pending draft. Clears the topic
    /// query on success.
    pub async fn create_draft_topic(&self, name: &str) -> Option<Topic> {
        let topic = self.insert_topic(name).await?;
        let attached = topic.clone();
        self.mutate(|state| {
            state.topic_query.clear();
            match state.draft.as_mut() {
                Some(draft) if !draft.topics.iter().any(|t| t.id == attached.id) => {
                    draft.topics.push(attached)
                }
                Some(_) => {}
                None => warn!("No recording draft to attach topic to"),
            }
        });
        Some(topic)
    }

    /// [`create_draft_topic`](Self::create_draft_topic) named by the current
    /// topic query.
    pub async fn create_draft_topic_from_query(&self) -> Option<Topic> {
        let name = self.state.borrow().topic_query.clone();
        self.create_draft_topic(&name).await
    }

    /// Persist the pending draft as a new entry.
    ///
    /// The recording is copied into internal storage and its duration read
    /// from the copy. Topic links are written only after the entry itself is
    /// stored, and a failed link does not undo the entry. The draft is taken
    /// out of the state up front, so a concurrent save finds nothing and a
    /// recording finished meanwhile becomes the next draft untouched.
    pub async fn save_entry(&self) -> Option<EntryId> {
        let mut taken = None;
        self.mutate(|state| taken = state.draft.take());
        let Some(draft) = taken else {
            warn!("Save ignored: no finished recording");
            return None;
        };

        if !draft.file.exists() {
            error!("Recording to save is missing: {}", draft.file.display());
            self.events.emit(JournalEvent::Error(UserError::AudioFileMissing));
            return None;
        }

        self.release_file(&draft.file);

        let saved = match self.copy_to_internal(&draft).await {
            Ok(saved) => saved,
            Err(e) => {
                error!("Failed to copy recording into storage: {:#}", e);
                discard_file(&draft.file);
                self.events.emit(JournalEvent::Error(UserError::SaveFailed));
                return None;
            }
        };

        let duration_ms = self.probe_duration(saved.clone()).await.or_else(|| {
            warn!("Duration probe failed, using recorded time");
            u64::try_from(draft.elapsed.as_millis()).ok()
        });

        let entry = new_entry(&draft, saved.clone(), duration_ms);
        let id = match self.store.upsert_entry(&entry).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to save entry: {}", e);
                discard_file(&draft.file);
                discard_file(&saved);
                self.events.emit(JournalEvent::Error(UserError::from(&e)));
                return None;
            }
        };
        info!("Saved entry {} ({})", id, saved.display());

        for topic in &draft.topics {
            let Some(topic_id) = topic.id else {
                warn!("Topic '{}' has no id, not linking", topic.name);
                continue;
            };
            if let Err(e) = self.store.upsert_association(id, topic_id).await {
                error!("Failed to link entry {} to topic '{}': {}", id, topic.name, e);
            }
        }

        discard_file(&draft.file);
        self.events.emit(JournalEvent::EntrySaved { id });
        Some(id)
    }

    /// Delete an entry and, once storage confirms, its audio file.
    pub async fn delete_entry(&self, id: EntryId) -> bool {
        let file = self
            .state
            .borrow()
            .entry(id)
            .map(|item| item.entry.file_path.clone());

        if let Some(file) = &file {
            self.release_file(file);
        }

        if let Err(e) = self.store.delete_entry(id).await {
            error!("Failed to delete entry {}: {}", id, e);
            let kind = UserError::from_storage(&e, UserError::DeleteFailed);
            self.events.emit(JournalEvent::Error(kind));
            return false;
        }

        if let Some(file) = file {
            discard_file(&file);
        }
        info!("Deleted entry {}", id);
        true
    }

    fn edit_draft(&self, change: impl FnOnce(&mut EntryDraft)) {
        self.mutate(|state| match state.draft.as_mut() {
            Some(draft) => change(draft),
            None => warn!("No recording draft to edit"),
        });
    }

    async fn insert_topic(&self, name: &str) -> Option<Topic> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Topic name is blank");
            return None;
        }

        let mut topic = Topic::new(name);
        match self.store.upsert_topic(&topic).await {
            Ok(id) => {
                info!("Created topic '{}' ({})", name, id);
                topic.id = Some(id);
                let known = topic.clone();
                self.mutate(|state| {
                    if !state.all_topics.iter().any(|t| t.id == known.id) {
                        state.all_topics.push(known);
                    }
                });
                Some(topic)
            }
            Err(e) => {
                error!("Failed to create topic '{}': {}", name, e);
                let kind = UserError::from_storage(&e, UserError::TopicNotCreated);
                self.events.emit(JournalEvent::Error(kind));
                None
            }
        }
    }

    /// Stop playback if it is using `file`.
    fn release_file(&self, file: &Path) {
        let _active = self.sessions();
        let playing = self
            .state
            .borrow()
            .now_playing
            .as_ref()
            .is_some_and(|playing| playing.file == file);
        if playing {
            info!("Stopping playback of {}", file.display());
            self.halt_playback();
        }
    }

    async fn copy_to_internal(&self, draft: &EntryDraft) -> Result<PathBuf> {
        let dir = self.paths.dir(StorageLocation::Internal)?;
        let target = dir.join(self.names.new_audio_file_name());
        if let Err(e) = tokio::fs::copy(&draft.file, &target).await {
            discard_file(&target);
            return Err(e).with_context(|| {
                format!("Failed to copy {} to {}", draft.file.display(), target.display())
            });
        }
        Ok(target)
    }

    async fn probe_duration(&self, file: PathBuf) -> Option<u64> {
        let probe = Arc::clone(&self.probe);
        tokio::task::spawn_blocking(move || probe.duration_ms(&file))
            .await
            .unwrap_or_else(|e| {
                warn!("Duration probe task failed: {}", e);
                None
            })
    }
}

fn new_entry(draft: &EntryDraft, file_path: PathBuf, duration_ms: Option<u64>) -> AudioEntry {
    let now = chrono::Utc::now().timestamp_millis();
    AudioEntry {
        id: None,
        title: draft.title.trim().to_string(),
        mood: draft.mood.unwrap_or_default().code().to_string(),
        file_path,
        created_at: now,
        updated_at: Some(now),
        description: non_blank(&draft.description),
        transcription: non_blank(&draft.transcription),
        duration_ms,
        archived: false,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
