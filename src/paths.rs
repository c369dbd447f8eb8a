//! Storage locations and audio file naming.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::StorageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageLocation {
    /// Temporary files, e.g. a recording that has not been saved yet
    Cache,
    /// Durable app-private storage
    Internal,
    /// Shared storage when available, otherwise internal
    External,
}

/// Resolves a [`StorageLocation`] to a writable directory.
pub trait PathProvider: Send + Sync {
    fn dir(&self, location: StorageLocation) -> Result<PathBuf>;
}

/// Directories taken from [`StorageConfig`], created on first use.
#[derive(Debug, Clone)]
pub struct DirectoryPaths {
    cache: PathBuf,
    internal: PathBuf,
    external: Option<PathBuf>,
}

impl DirectoryPaths {
    pub fn new(cache: PathBuf, internal: PathBuf, external: Option<PathBuf>) -> Self {
        Self {
            cache,
            internal,
            external,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.cache_dir.clone(),
            config.internal_dir.clone(),
            config.external_dir.clone(),
        )
    }
}

impl PathProvider for DirectoryPaths {
    fn dir(&self, location: StorageLocation) -> Result<PathBuf> {
        match location {
            StorageLocation::Cache => ensure_dir(&self.cache),
            StorageLocation::Internal => ensure_dir(&self.internal),
            StorageLocation::External => match &self.external {
                Some(external) => ensure_dir(external).or_else(|e| {
                    warn!("External storage unavailable ({:#}), using internal", e);
                    ensure_dir(&self.internal)
                }),
                None => ensure_dir(&self.internal),
            },
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Generates names for new audio files.
pub trait FileNameProvider: Send + Sync {
    fn new_audio_file_name(&self) -> String;
}

/// `<prefix>_<yyyyMMdd_HHmmss>_<8 hex chars>.<extension>`; lexical order
/// follows creation time.
#[derive(Debug, Clone)]
pub struct TimestampFileNames {
    prefix: String,
    extension: String,
}

impl TimestampFileNames {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.file_prefix, &config.audio_extension)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn name_at(&self, at: DateTime<Local>) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            at.format("%Y%m%d_%H%M%S"),
            &suffix[..8],
            self.extension
        )
    }
}

impl Default for TimestampFileNames {
    fn default() -> Self {
        Self::new("ej", "mp4")
    }
}

impl FileNameProvider for TimestampFileNames {
    fn new_audio_file_name(&self) -> String {
        self.name_at(Local::now())
    }
}
