pub mod health;
pub mod recommendations;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recommendations",
            post(recommendations::handle_enqueue),
        )
        .route(
            "/api/v1/recommendations/:job_id",
            get(recommendations::handle_poll).delete(recommendations::handle_cancel),
        )
        .with_state(state)
}
