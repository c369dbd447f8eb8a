use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::watch;
use tracing::debug;

use super::JournalStore;
use crate::error::StorageError;
use crate::model::{AudioEntry, EntryId, EntryWithTopics, Topic, TopicId};

#[derive(Debug, Clone, Default)]
struct Tables {
    entries: BTreeMap<EntryId, AudioEntry>,
    topics: BTreeMap<TopicId, Topic>,
    links: BTreeSet<(EntryId, TopicId)>,
    next_entry_id: EntryId,
    next_topic_id: TopicId,
}

impl Tables {
    fn entries_with_topics(&self) -> Vec<EntryWithTopics> {
        self.entries
            .iter()
            .map(|(id, entry)| EntryWithTopics {
                entry: entry.clone(),
                topics: self
                    .links
                    .range((*id, TopicId::MIN)..=(*id, TopicId::MAX))
                    .filter_map(|(_, topic_id)| self.topics.get(topic_id).cloned())
                    .collect(),
            })
            .collect()
    }

    fn topic_list(&self) -> Vec<Topic> {
        self.topics.values().cloned().collect()
    }
}

/// In-process [`JournalStore`] with live streams. Ids start at 1.
pub struct MemoryStore {
    tables: watch::Sender<Tables>,
    entry_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tables, _) = watch::channel(Tables {
            next_entry_id: 1,
            next_topic_id: 1,
            ..Tables::default()
        });
        Self {
            tables,
            entry_limit: None,
        }
    }

    /// A store that reports [`StorageError::DiskFull`] once it holds
    /// `limit` entries.
    pub fn with_entry_limit(limit: usize) -> Self {
        Self {
            entry_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn entries(&self) -> Vec<EntryWithTopics> {
        self.tables.borrow().entries_with_topics()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.tables.borrow().topic_list()
    }

    fn live<T, F>(&self, project: F) -> BoxStream<'static, T>
    where
        T: Send + 'static,
        F: Fn(&Tables) -> T + Send + 'static,
    {
        let rx = self.tables.subscribe();
        stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let tables = rx.borrow_and_update().clone();
            Some((tables, (rx, false)))
        })
        .map(move |tables| project(&tables))
        .boxed()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    fn stream_entries(&self) -> BoxStream<'static, Vec<EntryWithTopics>> {
        self.live(Tables::entries_with_topics)
    }

    fn stream_topics(&self) -> BoxStream<'static, Vec<Topic>> {
        self.live(Tables::topic_list)
    }

    async fn upsert_entry(&self, entry: &AudioEntry) -> Result<EntryId, StorageError> {
        let mut result = Err(StorageError::DiskFull);
        let limit = self.entry_limit;

        self.tables.send_if_modified(|tables| {
            if let Some(id) = entry.id.filter(|id| tables.entries.contains_key(id)) {
                tables.entries.insert(id, entry.clone());
                result = Ok(id);
                return true;
            }
            if limit.is_some_and(|limit| tables.entries.len() >= limit) {
                return false;
            }
            let id = entry.id.unwrap_or(tables.next_entry_id);
            tables.next_entry_id = tables.next_entry_id.max(id.saturating_add(1));
            tables.entries.insert(
                id,
                AudioEntry {
                    id: Some(id),
                    ..entry.clone()
                },
            );
            result = Ok(id);
            true
        });

        debug!("upsert_entry {:?} -> {:?}", entry.title, result);
        result
    }

    async fn upsert_topic(&self, topic: &Topic) -> Result<TopicId, StorageError> {
        let mut assigned = 0;

        self.tables.send_modify(|tables| {
            let existing = topic.id.filter(|id| tables.topics.contains_key(id)).or_else(|| {
                tables
                    .topics
                    .values()
                    .find(|t| t.name == topic.name)
                    .and_then(|t| t.id)
            });
            let id = existing.unwrap_or_else(|| {
                let id = topic.id.unwrap_or(tables.next_topic_id);
                tables.next_topic_id = tables.next_topic_id.max(id.saturating_add(1));
                id
            });
            tables.topics.insert(
                id,
                Topic {
                    id: Some(id),
                    ..topic.clone()
                },
            );
            assigned = id;
        });

        Ok(assigned)
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), StorageError> {
        self.tables.send_if_modified(|tables| {
            let removed = tables.entries.remove(&id).is_some();
            tables.links.retain(|(entry_id, _)| *entry_id != id);
            removed
        });
        Ok(())
    }

    async fn upsert_association(&self, entry_id: EntryId, topic_id: TopicId) -> Result<(), StorageError> {
        let mut result = Ok(());

        self.tables.send_if_modified(|tables| {
            if !tables.entries.contains_key(&entry_id) || !tables.topics.contains_key(&topic_id) {
                result = Err(StorageError::Other(anyhow::anyhow!(
                    "association {entry_id}->{topic_id} references a missing row"
                )));
                return false;
            }
            tables.links.insert((entry_id, topic_id))
        });

        result
    }
}
