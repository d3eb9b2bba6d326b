pub mod health;
pub mod screenings;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/screenings", post(screenings::handle_screening))
        .with_state(state)
}
