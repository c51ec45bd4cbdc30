//! Router configuration.
//!
//! Builds the Axum router with all endpoints, the CORS and tracing
//! layers, the body-size cap, and the per-client rate limit applied to
//! the whole API namespace.

use super::health::health_check;
use super::state::AppState;
use crate::api::events;
use crate::config::Config;
use crate::middleware::rate_limit_layer;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum accepted request body size (16 KiB).
const BODY_LIMIT_BYTES: usize = 16 * 1024;

/// Build the complete Axum router.
///
/// The static `upcoming` and suffix `event-stats` paths coexist with
/// the generic `/:id` routes; axum matches static segments first, so
/// the historical route-ordering constraint holds by construction.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let event_routes = Router::new()
        .route("/", post(events::create_event))
        .route("/upcoming", get(events::get_upcoming_events))
        .route("/:id/event-stats", get(events::get_event_stats))
        .route("/:id", get(events::get_event_details))
        .route("/:id/register", post(events::register_for_event))
        .route("/:id/cancel", post(events::cancel_registration));

    let api_routes = Router::new()
        .nest("/events", event_routes)
        .layer(rate_limit_layer(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .fallback(route_not_found)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// CORS layer restricted to the configured client address.
///
/// An unparsable origin falls back to allowing any origin, with a
/// warning, rather than refusing to start.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.server.client_address.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(
                client_address = %config.server.client_address,
                "invalid CORS origin, allowing any"
            );
            AllowOrigin::any()
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Envelope for requests that match no route.
async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "statusCode": 404,
            "message": "Route not found",
            "success": false,
        })),
    )
}
