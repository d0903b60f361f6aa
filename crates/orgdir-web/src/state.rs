//! Application state.

use orgdir_core::DirectoryStore;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DirectoryStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn DirectoryStore {
        self.store.as_ref()
    }
}
