use std::path::PathBuf;
use std::time::Duration;

use crate::filter::{filter_entries, FilterQuery, SortOrder};
use crate::model::{EntryId, EntryWithTopics, Mood, Topic, TopicId};

/// The coordinator's working set and the projection derived from it.
#[derive(Debug, Clone, Default)]
pub struct JournalState {
    pub entries: Vec<EntryWithTopics>,
    /// `entries` after the current filters and sort; recomputed on every
    /// change to any filter input
    pub filtered: Vec<EntryWithTopics>,
    pub all_topics: Vec<Topic>,
    /// Text typed into the topic picker
    pub topic_query: String,
    /// `all_topics` whose names contain `topic_query`, ignoring case;
    /// recomputed with `filtered`
    pub suggested_topics: Vec<Topic>,
    pub selected_moods: Vec<Mood>,
    pub selected_topics: Vec<Topic>,
    pub query: String,
    pub from_millis: Option<i64>,
    pub to_millis: Option<i64>,
    pub sort_order: SortOrder,
    pub now_playing: Option<NowPlaying>,
    /// A finished recording not yet saved as an entry
    pub draft: Option<EntryDraft>,
}

impl JournalState {
    pub fn selected_topic_ids(&self) -> Vec<TopicId> {
        self.selected_topics.iter().filter_map(|t| t.id).collect()
    }

    pub(crate) fn refilter(&mut self) {
        let topic_ids = self.selected_topic_ids();
        self.filtered = filter_entries(&FilterQuery {
            entries: &self.entries,
            moods: &self.selected_moods,
            topic_ids: &topic_ids,
            text: &self.query,
            from_millis: self.from_millis,
            to_millis: self.to_millis,
            sort: self.sort_order,
        });
        self.suggested_topics = suggest_topics(&self.all_topics, &self.topic_query);
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntryWithTopics> {
        self.entries.iter().find(|item| item.entry.id == Some(id))
    }
}

/// What the playback tracker was last asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// `None` for the unsaved draft recording
    pub entry_id: Option<EntryId>,
    pub file: PathBuf,
    /// Stored length; preferred over the player's report
    pub duration_ms: Option<u64>,
}

/// Metadata collected for a finished recording before it is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub file: PathBuf,
    pub elapsed: Duration,
    pub title: String,
    pub mood: Option<Mood>,
    pub description: String,
    pub transcription: String,
    pub topics: Vec<Topic>,
}

impl EntryDraft {
    pub fn new(file: PathBuf, elapsed: Duration) -> Self {
        Self {
            file,
            elapsed,
            title: String::new(),
            mood: None,
            description: String::new(),
            transcription: String::new(),
            topics: Vec::new(),
        }
    }
}

fn suggest_topics(topics: &[Topic], query: &str) -> Vec<Topic> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return topics.to_vec();
    }
    topics
        .iter()
        .filter(|topic| topic.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Add `item` if absent, remove it if present.
pub(crate) fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(index) = items.iter().position(|existing| *existing == item) {
        items.remove(index);
    } else {
        items.push(item);
    }
}
