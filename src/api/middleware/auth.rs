//! API key gate middleware.
//!
//! Extracts `x-api-key`, checks membership in the configured allow-list,
//! and rejects with 401 before any handler or rate accounting runs.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Require a valid `x-api-key` header on external routes.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer).
pub async fn require_api_key(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_api_key_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn require_api_key_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = req.headers().get("x-api-key").and_then(|v| v.to_str().ok());

    if !ctx.keys.validate(key) {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
