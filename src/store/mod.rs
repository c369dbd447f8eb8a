//! Storage collaborator contract.
//!
//! The journal core never talks to a database directly; it reads live
//! projections and writes through [`JournalStore`]. [`MemoryStore`] is an
//! in-process implementation.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::StorageError;
use crate::model::{AudioEntry, EntryId, EntryWithTopics, Topic, TopicId};

#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Current entries with their topics, then a new list after every change.
    fn stream_entries(&self) -> BoxStream<'static, Vec<EntryWithTopics>>;

    /// Current topics, then a new list after every change.
    fn stream_topics(&self) -> BoxStream<'static, Vec<Topic>>;

    /// Insert (when `entry.id` is `None`) or replace; returns the entry's id.
    async fn upsert_entry(&self, entry: &AudioEntry) -> Result<EntryId, StorageError>;

    /// Insert or replace; returns the topic's id.
    async fn upsert_topic(&self, topic: &Topic) -> Result<TopicId, StorageError>;

    async fn delete_entry(&self, id: EntryId) -> Result<(), StorageError>;

    async fn upsert_association(&self, entry_id: EntryId, topic_id: TopicId) -> Result<(), StorageError>;
}
