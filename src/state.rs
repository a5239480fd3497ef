// src/state.rs
use std::sync::Arc;

use crate::metrics::Metrics;
use crate::store::ProductStore;

/// Process-wide handles, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductStore>, metrics: Metrics) -> Self {
        Self { store, metrics }
    }
}
