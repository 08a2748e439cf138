use std::sync::Arc;

use tokio::sync::watch;

use crate::types::FormSnapshot;

/// Observable holder of the form snapshot. Clones share the same state.
#[derive(Clone)]
pub struct FormStore {
    state: Arc<watch::Sender<FormSnapshot>>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::with_snapshot(FormSnapshot::default())
    }

    pub fn with_snapshot(snapshot: FormSnapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn get(&self) -> FormSnapshot {
        self.state.borrow().clone()
    }

    /// Applies `apply` atomically. Subscribers are notified only when it returns `true`.
    pub fn update<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut FormSnapshot) -> bool,
    {
        self.state.send_if_modified(apply)
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.state.subscribe()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}
