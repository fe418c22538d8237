use crate::api::{found, ErrorResponse};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProcessForm {
    #[serde(default)]
    pub recipe_url: Option<String>,
}

/// Fetch the submitted URL and send the browser to the recipe's clean path.
pub async fn process_recipe(
    State(resolver): State<AppState>,
    Form(form): Form<ProcessForm>,
) -> Response {
    let Some(url) = form
        .recipe_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return found("/");
    };

    match resolver.process(url).await {
        Ok(processed) => found(&format!("/{}", processed.path)),
        Err(e) => {
            tracing::warn!(url, error = %e, "failed to process recipe");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Error processing recipe: {}", e),
                }),
            )
                .into_response()
        }
    }
}
