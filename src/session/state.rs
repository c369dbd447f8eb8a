use std::time::Duration;

/// Observable recording state. `is_paused` implies `is_recording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingSessionState {
    pub is_recording: bool,
    pub is_paused: bool,
    /// Advances only while recording and not paused
    pub elapsed: Duration,
}

impl RecordingSessionState {
    /// The condition under which elapsed time accumulates.
    pub fn is_capturing(&self) -> bool {
        self.is_recording && !self.is_paused
    }
}

/// Observable playback state. `is_paused` implies `is_playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSessionState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub position: Duration,
    /// Valid once the player has reported prepared; kept across `stop`
    pub duration: Duration,
}

impl PlaybackSessionState {
    /// The condition under which position is polled.
    pub fn is_advancing(&self) -> bool {
        self.is_playing && !self.is_paused
    }

    pub fn is_idle(&self) -> bool {
        !self.is_playing && !self.is_paused && self.position.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    /// `play_file` was called; waiting for the player's prepared callback
    Preparing,
    Playing,
    Paused,
}
