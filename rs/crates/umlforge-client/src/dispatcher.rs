//! Request dispatcher: one generate call, three lifecycle events.
//!
//! `Pending` is applied before `dispatch` returns; the call itself runs on a
//! spawned task that applies `Success` or `Failure` when it resolves. There is
//! no de-duplication: every dispatch is an independent call.
//!
//! Each task runs under a child of the dispatcher's root token. Once that
//! token is cancelled the task exits without touching the store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use umlforge_core::Event;

use crate::generator::GeneratorClient;
use crate::store::Store;

pub struct Dispatcher {
    generator: Arc<GeneratorClient>,
    store: Store,
    root: CancellationToken,
    next_id: AtomicU64,
}

/// Handle to one in-flight generate call.
pub struct RequestHandle {
    pub id: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RequestHandle {
    /// Drop this call's result; the store keeps whatever it has now.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

impl Dispatcher {
    pub fn new(generator: Arc<GeneratorClient>, store: Store, root: CancellationToken) -> Self {
        Self {
            generator,
            store,
            root,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Start a generate call for `description`. Must run inside a Tokio runtime.
    pub fn dispatch(&self, description: String) -> RequestHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.store.apply(Event::Pending);

        let token = self.root.child_token();
        let task = tokio::spawn(run_request(
            id,
            self.generator.clone(),
            self.store.clone(),
            token.clone(),
            description,
        ));
        RequestHandle { id, token, task }
    }

    /// Cancel every in-flight call. Callers check
    /// [`is_shut_down`](Self::is_shut_down) before dispatching again.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.root.clone()
    }
}

async fn run_request(
    id: u64,
    generator: Arc<GeneratorClient>,
    store: Store,
    token: CancellationToken,
    description: String,
) {
    let t0 = Instant::now();
    tracing::info!(request = id, chars = description.chars().count(), "generate: started");

    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::info!(request = id, "generate: cancelled before completion");
            return;
        }
        r = generator.generate(&description) => r,
    };

    // The token may have fired while the response body was being handed over.
    if token.is_cancelled() {
        tracing::info!(request = id, "generate: cancelled, result dropped");
        return;
    }

    let elapsed_ms = t0.elapsed().as_millis() as u64;
    match outcome {
        Ok(payload) => {
            tracing::info!(request = id, elapsed_ms, bytes = payload.len(), "generate: ✓");
            store.apply(Event::Success(payload));
        }
        Err(e) => {
            tracing::warn!(
                request = id,
                elapsed_ms,
                timeout = e.is_timeout(),
                error = %e,
                "generate: ✗"
            );
            store.apply(Event::Failure(e.to_string()));
        }
    }
}
