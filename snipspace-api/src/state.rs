//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use snipspace_storage::{ContentStore, InMemoryStore};

/// The content store every handler talks to.
pub type SharedStore = Arc<dyn ContentStore>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Backing store, in-memory or Postgres.
    pub store: SharedStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }

    /// State over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(Instant, start_time);
