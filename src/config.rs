use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::RecordingQuality;
use crate::filter::SortOrder;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Scratch space for in-progress recordings
    pub cache_dir: PathBuf,
    /// Durable home for saved entries
    pub internal_dir: PathBuf,
    /// Removable/shared storage; falls back to `internal_dir` when unset
    pub external_dir: Option<PathBuf>,
    pub audio_extension: String,
    pub file_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = std::env::temp_dir().join("voice-journal");
        Self {
            cache_dir: base.join("cache"),
            internal_dir: base.join("files"),
            external_dir: None,
            audio_extension: "mp4".to_string(),
            file_prefix: "ej".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub quality: RecordingQuality,
    pub tick_interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            quality: RecordingQuality::Medium,
            tick_interval_ms: 200,
        }
    }
}

impl RecordingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
        }
    }
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub default_sort: SortOrder,
    /// Buffer size of the one-shot event channel
    pub event_capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            default_sort: SortOrder::DateAscending,
            event_capacity: 16,
        }
    }
}

impl Config {
    /// Load from a TOML file (extension optional), then apply
    /// `VOICE_JOURNAL__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("VOICE_JOURNAL").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg = Config::from_toml("[playback]\npoll_interval_ms = 50\n").unwrap();

        assert_eq!(cfg.playback.poll_interval_ms, 50);
        assert_eq!(cfg.recording.tick_interval_ms, 200);
        assert_eq!(cfg.recording.quality, RecordingQuality::Medium);
        assert_eq!(cfg.storage.audio_extension, "mp4");
        assert_eq!(cfg.journal.event_capacity, 16);
    }

    #[test]
    fn test_parses_enums_and_paths() {
        let cfg = Config::from_toml(
            r#"
            [storage]
            cache_dir = "/tmp/vj/cache"
            internal_dir = "/tmp/vj/files"
            external_dir = "/mnt/sd/vj"

            [recording]
            quality = "very_high"

            [journal]
            default_sort = "title_descending"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.storage.cache_dir, PathBuf::from("/tmp/vj/cache"));
        assert_eq!(cfg.storage.external_dir, Some(PathBuf::from("/mnt/sd/vj")));
        assert_eq!(cfg.recording.quality, RecordingQuality::VeryHigh);
        assert_eq!(cfg.journal.default_sort, SortOrder::TitleDescending);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let cfg = Config::from_toml("[recording]\ntick_interval_ms = 0\n").unwrap();
        assert_eq!(cfg.recording.tick_interval(), Duration::from_millis(1));
    }
}
