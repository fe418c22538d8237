pub mod health;
pub mod process;
pub mod recipes;

use crate::AppState;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Routes, with state attached. Recipe keys are matched last so fixed
/// routes always win.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(recipes::list_recipes))
        .route("/health", get(health::health))
        .route("/process", post(process::process_recipe))
        .route("/{*path}", get(recipes::get_recipe))
        .with_state(state)
}

/// 302 Found to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
