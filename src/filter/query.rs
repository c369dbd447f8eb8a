use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::{EntryWithTopics, Mood, TopicId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateAscending,
    DateDescending,
    TitleAscending,
    TitleDescending,
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "date_ascending" | "date_asc" | "date" => Ok(SortOrder::DateAscending),
            "date_descending" | "date_desc" => Ok(SortOrder::DateDescending),
            "title_ascending" | "title_asc" | "title" => Ok(SortOrder::TitleAscending),
            "title_descending" | "title_desc" => Ok(SortOrder::TitleDescending),
            other => anyhow::bail!("unknown sort order: {other}"),
        }
    }
}

/// Inputs for one run of [`filter_entries`](super::filter_entries).
///
/// Borrowed so the coordinator can build a query straight from its working
/// state without cloning the entry list.
#[derive(Debug, Clone, Copy)]
pub struct FilterQuery<'a> {
    pub entries: &'a [EntryWithTopics],
    pub moods: &'a [Mood],
    pub topic_ids: &'a [TopicId],
    pub text: &'a str,
    /// Inclusive lower bound on `created_at`, epoch ms
    pub from_millis: Option<i64>,
    /// Inclusive upper bound on `created_at`, epoch ms
    pub to_millis: Option<i64>,
    pub sort: SortOrder,
}

impl<'a> FilterQuery<'a> {
    /// A query with every filter empty; only sorts.
    pub fn new(entries: &'a [EntryWithTopics]) -> Self {
        Self {
            entries,
            moods: &[],
            topic_ids: &[],
            text: "",
            from_millis: None,
            to_millis: None,
            sort: SortOrder::default(),
        }
    }
}
