//! API router.
//!
//! Routes are nested under `/api/`. External v1 routes carry the full
//! protection stack; internal routes (consumed by the product's own web
//! frontend, which terminates auth upstream) skip the key gate and limiter.
//!
//! Middleware stack on external routes (outermost → innermost):
//! CORS → Extension → API key gate → Rate limiter → Handler.
//! The gate runs before the limiter so bad keys get 401, not 429, and so
//! unauthenticated traffic never consumes a window.

use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Preflight cache lifetime (24 hours).
const CORS_MAX_AGE_SECS: u64 = 86_400;

/// Build the full API router for the given context.
pub fn api_router(ctx: ApiContext) -> Router {
    let policy = ctx.origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().map(|o| policy.is_allowed(o)).unwrap_or(false)
        }))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")])
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS));

    // External v1 routes — key-gated and rate-limited.
    let external = Router::new()
        .route("/v1/ocr-invoice", post(endpoints::ocr_invoice::scan))
        .route("/v1/ocr-health", post(endpoints::ocr_health::scan))
        .route("/v1/health-advice", post(endpoints::advice::generate))
        .route("/v1/health-summary", post(endpoints::summary::generate))
        .with_state(ctx.clone())
        // Layers apply bottom-to-top: rate limiter innermost, then gate,
        // then the Extension all middleware reads ApiContext from.
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::middleware::from_fn(middleware::auth::require_api_key))
        .layer(axum::Extension(ctx.clone()));

    // Internal routes — same handlers, no gate, no limiter, no archival
    // expectations beyond what the handlers themselves do.
    let internal = Router::new()
        .route("/health", get(endpoints::status::check))
        .route("/ocr-invoice", post(endpoints::ocr_invoice::scan))
        .route("/ocr-health", post(endpoints::ocr_health::scan))
        .with_state(ctx);

    Router::new()
        .nest("/api", external)
        .nest("/api", internal)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
