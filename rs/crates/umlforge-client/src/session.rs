use std::sync::Arc;

use tokio::sync::watch;

/// The prompt being edited. View-local: it never enters the store and a
/// generate request does not clear it.
#[derive(Clone)]
pub struct Draft {
    tx: Arc<watch::Sender<String>>,
}

impl Draft {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the draft; subscribers are only woken on a real change.
    pub fn set(&self, value: String) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}
