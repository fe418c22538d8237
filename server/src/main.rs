mod api;
mod config;

use anyhow::Context;
use axum::extract::MatchedPath;
use axum::http::Request;
use nyetcooking_core::{
    BrowserClient, CacheBackend, CacheConfig, RecipeCache, RedisBackend, Resolver, TokioSleeper,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;

/// Application state shared across all handlers
pub type AppState = Arc<Resolver>;

/// Console logging, filtered by `RUST_LOG` (default: info).
fn init_telemetry() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();

    let server_config = ServerConfig::from_env();
    let cache_config = CacheConfig::from_env();

    // Never fatal: without Redis the process runs on its local store.
    let backend = RedisBackend::connect(&cache_config, &TokioSleeper)
        .await
        .map(|b| Arc::new(b) as Arc<dyn CacheBackend>);
    let cache = Arc::new(RecipeCache::from_connection(backend));
    tracing::info!(backend = cache.backend_name(), "recipe cache ready");

    let client = BrowserClient::new().context("Failed to build HTTP client")?;
    let state: AppState = Arc::new(Resolver::new(Arc::new(client), cache));

    let app = api::router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                // Health checks poll constantly
                if matched_path == "/health" {
                    tracing::trace_span!("http_request")
                } else {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                    if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                        return;
                    }
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    );

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind_addr()))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
