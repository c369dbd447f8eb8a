use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Mood;

pub type EntryId = i64;
pub type TopicId = i64;

/// A recorded memo and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEntry {
    /// Unset until storage assigns one
    #[serde(default)]
    pub id: Option<EntryId>,
    pub title: String,
    /// Canonical lowercase mood code, see [`Mood::code`]
    pub mood: String,
    pub file_path: PathBuf,
    /// Epoch milliseconds
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub archived: bool,
}

impl AudioEntry {
    pub fn mood(&self) -> Mood {
        Mood::from_code(&self.mood)
    }
}

/// User-defined tag. Name uniqueness is the storage layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    #[serde(default)]
    pub id: Option<TopicId>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

/// Read projection of an entry together with its associated topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryWithTopics {
    pub entry: AudioEntry,
    #[serde(default)]
    pub topics: Vec<Topic>,
}
