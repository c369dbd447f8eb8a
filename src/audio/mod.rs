//! Raw audio capabilities and codec helpers.
//!
//! The recorder and player traits wrap platform capture/playback; the
//! session trackers own one instance each. [`FileDurationProbe`] reads the
//! length of a finished recording.

pub mod player;
pub mod probe;
pub mod recorder;

pub use player::{AudioPlayer, PlayerCallback};
pub use probe::{DurationProbe, FileDurationProbe};
pub use recorder::{negotiate_quality, AudioRecorder, EncoderSettings, RecordingQuality};
