//! Restartable tick source.
//!
//! Each item is the wall-clock time since the previous item, not the nominal
//! interval, so a late wake-up is absorbed into the next delta instead of
//! drifting.

use futures::stream::{self, Stream};
use std::time::Duration;
use tokio::time::Instant;

/// Default cadence for elapsed-time and position updates.
pub const DEFAULT_TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    interval: Duration,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Infinite stream of elapsed-time deltas. Every call starts a fresh
    /// sequence measured from the moment of the call; dropping the stream
    /// is the only way to end it.
    pub fn ticks(&self) -> impl Stream<Item = Duration> + Send + 'static {
        let interval = self.interval;
        stream::unfold(Instant::now(), move |last_emit| async move {
            tokio::time::sleep(interval).await;
            let now = Instant::now();
            Some((now - last_emit, now))
        })
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}
