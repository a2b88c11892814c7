//! Load tracking for cache slots.
//!
//! Every cached record or schema lives in a [`Slot`]: the value itself plus
//! a watch channel broadcasting its [`LoadState`]. Readers that need the
//! value subscribe and wait for `Ready` instead of polling; the channel
//! keeps only the latest state, so a subscriber that misses an intermediate
//! transition still resumes with the current one.

use tokio::sync::watch;

/// Lifecycle of a cached entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has asked for the entry yet.
    Idle,
    /// A load is in flight; the next transition is `Ready` or `Failed`.
    Loading,
    /// The entry is cached and current.
    Ready,
    /// The last load failed. The slot is retryable: the next fetch starts
    /// a fresh load rather than replaying this failure.
    Failed(String),
}

impl LoadState {
    /// True once the entry is cached.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A cache slot: the stored value plus the broadcast of its load state.
#[derive(Debug)]
pub struct Slot<T> {
    pub value: T,
    state: watch::Sender<LoadState>,
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self { value, state }
    }

    /// Snapshot of the current load state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Publishes a new state to every subscriber.
    pub fn set_state(&self, state: LoadState) {
        self.state.send_replace(state);
    }
}

/// Waits until the watched slot settles, returning the failure reason if
/// it settled on `Failed`.
///
/// A dropped sender counts as failure too: the value can no longer arrive.
pub async fn await_ready(rx: &mut watch::Receiver<LoadState>) -> Result<(), String> {
    loop {
        {
            let state = rx.borrow_and_update();
            match &*state {
                LoadState::Ready => return Ok(()),
                LoadState::Failed(reason) => return Err(reason.clone()),
                LoadState::Idle | LoadState::Loading => {}
            }
        }
        if rx.changed().await.is_err() {
            return Err("cache entry dropped while loading".to_string());
        }
    }
}
