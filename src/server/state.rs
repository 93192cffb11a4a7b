use crate::location::CoordinateIndex;
use std::sync::Arc;

/// Shared by every handler. The index is read-only once built, so no lock.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<CoordinateIndex>,
}

impl AppState {
    pub fn new(index: CoordinateIndex) -> Self {
        Self {
            index: Arc::new(index),
        }
    }
}
