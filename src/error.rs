//! Error types shared across the journal core.

use thiserror::Error;

/// Failure reported by the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage medium has no room left for the write.
    #[error("storage medium full")]
    DiskFull,

    #[error("storage failure: {0}")]
    Other(#[from] anyhow::Error),
}

/// Failures surfaced to the user through the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserError {
    /// Storage reported that the device is full
    StorageFull,
    /// Saving a new entry failed; nothing was kept
    SaveFailed,
    /// The recorder could not be started
    RecordingUnavailable,
    /// A new topic could not be stored
    TopicNotCreated,
    /// The audio file to play or save does not exist
    AudioFileMissing,
    /// The player could not load the file
    PlaybackFailed,
    /// Storage refused to delete an entry
    DeleteFailed,
}

impl UserError {
    /// Storage failure reported as `fallback` unless the medium is full.
    pub fn from_storage(err: &StorageError, fallback: UserError) -> Self {
        match err {
            StorageError::DiskFull => UserError::StorageFull,
            StorageError::Other(_) => fallback,
        }
    }
}

impl From<&StorageError> for UserError {
    fn from(err: &StorageError) -> Self {
        UserError::from_storage(err, UserError::SaveFailed)
    }
}
