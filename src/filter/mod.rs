//! Filter/sort engine over a snapshot of journal entries.
//!
//! An entry passes when every predicate holds:
//! - mood: no moods selected, or the entry's decoded mood is selected
//! - topic: no topics selected, or at least one of its topics is selected
//! - text: blank query, or a case-insensitive substring of title,
//!   description or transcription
//! - date: `created_at` within the inclusive `[from, to]` bounds
//!
//! Sorting is stable and runs after filtering.

mod query;

pub use query::{FilterQuery, SortOrder};

use crate::model::{AudioEntry, EntryWithTopics, Mood, Topic, TopicId};
use std::cmp::Ordering;

/// Apply `query` and return the matching entries in sort order.
pub fn filter_entries(query: &FilterQuery<'_>) -> Vec<EntryWithTopics> {
    let needle = if query.text.trim().is_empty() {
        String::new()
    } else {
        query.text.to_lowercase()
    };

    let mut matched: Vec<EntryWithTopics> = query
        .entries
        .iter()
        .filter(|item| {
            matches_mood(item.entry.mood(), query.moods)
                && matches_topics(&item.topics, query.topic_ids)
                && matches_text(&item.entry, &needle)
                && matches_date_range(item.entry.created_at, query.from_millis, query.to_millis)
        })
        .cloned()
        .collect();

    // slice::sort_by is stable, so ties keep their input order
    matched.sort_by(|a, b| compare(query.sort, &a.entry, &b.entry));
    matched
}

fn matches_mood(mood: Mood, selected: &[Mood]) -> bool {
    selected.is_empty() || selected.contains(&mood)
}

fn matches_topics(topics: &[Topic], selected: &[TopicId]) -> bool {
    if selected.is_empty() {
        return true;
    }
    topics
        .iter()
        .filter_map(|topic| topic.id)
        .any(|id| selected.contains(&id))
}

/// `needle` is lowercased; empty means no text filter.
fn matches_text(entry: &AudioEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&entry.title)
        || entry.description.as_deref().is_some_and(contains)
        || entry.transcription.as_deref().is_some_and(contains)
}

fn matches_date_range(created_at: i64, from: Option<i64>, to: Option<i64>) -> bool {
    let from = from.unwrap_or(i64::MIN);
    let to = to.unwrap_or(i64::MAX);
    (from..=to).contains(&created_at)
}

fn compare(order: SortOrder, a: &AudioEntry, b: &AudioEntry) -> Ordering {
    match order {
        SortOrder::DateAscending => a.created_at.cmp(&b.created_at),
        SortOrder::DateDescending => b.created_at.cmp(&a.created_at),
        SortOrder::TitleAscending => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortOrder::TitleDescending => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
    }
}
