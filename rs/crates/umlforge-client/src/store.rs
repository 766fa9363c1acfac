//! Runtime holder for the request store.
//!
//! All mutation goes through [`Store::apply`], which runs the pure reducer
//! inside the watch channel's write lock, so concurrent request tasks never
//! interleave a transition.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use umlforge_core::{reduce, Event, StoreState};

/// Store state tagged with a monotonically increasing revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Revision {
    pub seq: u64,
    #[serde(flatten)]
    pub state: StoreState,
}

#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<Revision>>,
}

impl Store {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Revision::default());
        Self { tx: Arc::new(tx) }
    }

    /// Reduce `event` into the current state and notify subscribers.
    pub fn apply(&self, event: Event) -> Revision {
        let name = event.name();
        let mut applied = Revision::default();
        self.tx.send_modify(|rev| {
            rev.state = reduce(&rev.state, event);
            rev.seq += 1;
            applied = rev.clone();
        });
        tracing::debug!(
            event = name,
            seq = applied.seq,
            pending = applied.state.request.pending,
            success = applied.state.request.success,
            failure = applied.state.request.failure,
            "store updated"
        );
        applied
    }

    pub fn current(&self) -> Revision {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Revision> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
