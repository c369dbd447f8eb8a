//! Journal domain types: entries, topics and moods.

mod entry;
mod mood;

pub use entry::{AudioEntry, EntryId, EntryWithTopics, Topic, TopicId};
pub use mood::Mood;
