use std::sync::Arc;
use tokio::runtime::Handle;

use crate::config::Config;

/// Process-lifetime handle passed to the trackers and the coordinator:
/// the runtime they spawn background tasks on, and the loaded settings.
#[derive(Clone)]
pub struct JournalContext {
    pub runtime: Handle,
    pub config: Arc<Config>,
}

impl JournalContext {
    /// Capture the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(config: Config) -> Self {
        Self::with_runtime(Handle::current(), config)
    }

    pub fn with_runtime(runtime: Handle, config: Config) -> Self {
        Self {
            runtime,
            config: Arc::new(config),
        }
    }
}
