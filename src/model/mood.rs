use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five fixed moods an entry can carry. Declaration order is the
/// canonical ordering used wherever moods are listed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sad,
    Stressed,
    #[default]
    Neutral,
    Peaceful,
    Excited,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Sad,
        Mood::Stressed,
        Mood::Neutral,
        Mood::Peaceful,
        Mood::Excited,
    ];

    /// Locale-independent code persisted with an entry.
    pub fn code(self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Stressed => "stressed",
            Mood::Neutral => "neutral",
            Mood::Peaceful => "peaceful",
            Mood::Excited => "excited",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mood::Sad => "Sad",
            Mood::Stressed => "Stressed",
            Mood::Neutral => "Neutral",
            Mood::Peaceful => "Peaceful",
            Mood::Excited => "Excited",
        }
    }

    /// Decode a stored code. Unknown or empty codes read as `Neutral`.
    pub fn from_code(code: &str) -> Mood {
        code.parse().unwrap_or(Mood::Neutral)
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.code() == code)
            .ok_or_else(|| anyhow::anyhow!("unknown mood code: {s:?}"))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
