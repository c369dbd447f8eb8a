pub mod audio;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod filter;
pub mod model;
pub mod paths;
pub mod session;
pub mod store;
pub mod timer;

pub use audio::{
    negotiate_quality, AudioPlayer, AudioRecorder, DurationProbe, EncoderSettings,
    FileDurationProbe, PlayerCallback, RecordingQuality,
};
pub use config::Config;
pub use context::JournalContext;
pub use coordinator::{Collaborators, EntryDraft, JournalCoordinator, JournalState, NowPlaying};
pub use error::{StorageError, UserError};
pub use events::{EventChannel, JournalEvent};
pub use filter::{filter_entries, FilterQuery, SortOrder};
pub use model::{AudioEntry, EntryId, EntryWithTopics, Mood, Topic, TopicId};
pub use paths::{DirectoryPaths, FileNameProvider, PathProvider, StorageLocation, TimestampFileNames};
pub use session::{
    PlaybackPhase, PlaybackSessionState, PlaybackTracker, RecordingSessionState, RecordingTracker,
};
pub use store::{JournalStore, MemoryStore};
pub use timer::Timer;
