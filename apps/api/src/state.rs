use std::sync::Arc;

use crate::queue::RecommendationQueue;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<RecommendationQueue>,
}
