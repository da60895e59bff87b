pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents API
        .route("/api/v1/documents/upload", post(documents::handle_upload))
        .route("/api/v1/documents", get(documents::handle_list))
        .route("/api/v1/documents/:id", delete(documents::handle_delete))
        // Interview API
        .route("/api/v1/interviews/start", post(interview::handle_start))
        .route(
            "/api/v1/interviews/:id/answer",
            post(interview::handle_answer),
        )
        .route("/api/v1/interviews/:id", get(interview::handle_get_session))
        .with_state(state)
}
