use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// "redis" or "memory"
    pub cache_backend: String,
}

pub async fn health(State(resolver): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        cache_backend: resolver.cache().backend_name().to_string(),
    })
}
