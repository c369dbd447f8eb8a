use anyhow::Result;
use std::path::Path;

/// Callback fired by the player from whatever thread it runs on.
pub type PlayerCallback = Box<dyn Fn() + Send + Sync>;

/// Platform playback primitive.
///
/// Loading is asynchronous: `play_file` returns immediately and the player
/// later fires the prepared callback once decoding is ready, then the
/// complete callback when playback reaches the end. Position and duration
/// reads may fail before the prepared callback has fired.
pub trait AudioPlayer: Send + Sync {
    /// Tear down any current load and begin loading `file`.
    fn play_file(&self, file: &Path) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn resume(&self) -> Result<()>;

    /// Stop and release decoder resources.
    fn stop(&self) -> Result<()>;

    fn seek_to(&self, position_ms: u64) -> Result<()>;

    fn set_on_prepared(&self, callback: PlayerCallback);

    fn set_on_complete(&self, callback: PlayerCallback);

    fn current_position_ms(&self) -> Result<u64>;

    fn duration_ms(&self) -> Result<u64>;

    fn is_playing(&self) -> bool;
}
