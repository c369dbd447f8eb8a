use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Tracker state published through a watch channel, plus the generation of
/// the background task currently allowed to write to it.
///
/// Background writes go through [`Published::update_if_current`], which
/// checks the generation while holding the channel's write lock. Bumping the
/// generation before a transition therefore shuts out any task that was
/// cancelled but had not yet noticed.
pub(crate) struct Published<S> {
    sender: watch::Sender<S>,
    generation: AtomicU64,
}

impl<S> Published<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender,
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    pub(crate) fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.sender.borrow().clone()
    }

    /// Apply a transition as one whole-value replace.
    pub(crate) fn update(&self, modify: impl FnOnce(&mut S)) {
        self.sender.send_modify(modify);
    }

    /// Retire the current task generation and return the next one.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply `modify` only if `generation` is still current. Returns false
    /// once the caller's task has been superseded.
    pub(crate) fn update_if_current(&self, generation: u64, modify: impl FnOnce(&mut S)) -> bool {
        let mut current = true;
        self.sender.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                current = false;
                return false;
            }
            modify(state);
            true
        });
        current
    }
}

/// Slot for the single background task a tracker runs at a time.
#[derive(Default)]
pub(crate) struct Worker {
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn set(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.cancel();
    }
}
