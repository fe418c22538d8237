use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use nyetcooking_core::{recipe_to_markdown, Recipe, ResolveError};
use serde::Serialize;

const MARKDOWN_SUFFIX: &str = "/markdown";

#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub recipes: Vec<String>,
}

/// Every cached key, sorted.
pub async fn list_recipes(State(resolver): State<AppState>) -> impl IntoResponse {
    Json(IndexResponse {
        recipes: resolver.cache().keys().await,
    })
}

/// `/{path}` serves recipe JSON, `/{path}/markdown` the Markdown rendering.
///
/// The key is a clean path ("example.com/recipes/pie") or a slug.
pub async fn get_recipe(State(resolver): State<AppState>, Path(path): Path<String>) -> Response {
    let (key, markdown) = match path.strip_suffix(MARKDOWN_SUFFIX) {
        Some(key) => (key, true),
        None => (path.as_str(), false),
    };

    let recipe = match resolver.lookup(key).await {
        Ok(recipe) => recipe,
        Err(e) => return error_response(key, e),
    };

    if markdown {
        render_markdown(&recipe)
    } else {
        (StatusCode::OK, Json(recipe)).into_response()
    }
}

fn render_markdown(recipe: &Recipe) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        recipe_to_markdown(recipe),
    )
        .into_response()
}

fn error_response(key: &str, error: ResolveError) -> Response {
    match error {
        ResolveError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response(),
        other => {
            tracing::error!(key, error = %other, "recipe lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
