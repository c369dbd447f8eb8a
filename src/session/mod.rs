//! Recording and playback session trackers
//!
//! Each tracker exclusively owns one raw capability and exposes:
//! - a `watch` channel with the current session state
//! - synchronous start/pause/resume/stop operations applied in call order
//! - one background task (elapsed-time accumulation or position polling)
//!   that runs only while the session is actively advancing

mod playback;
mod recording;
mod state;
mod worker;

pub use playback::PlaybackTracker;
pub use recording::RecordingTracker;
pub use state::{PlaybackPhase, PlaybackSessionState, RecordingSessionState};
