use crate::app::AppState;
use crate::handlers::{form_page, health_check, result_handler, schemes_handler, submit_handler};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(form_page))
        .route("/health", get(health_check))
        .route("/submit", post(submit_handler))
        .route("/result", get(result_handler))
        .route("/schemes", get(schemes_handler))
}
