//! Per-key fixed-window rate limiting middleware.
//!
//! Runs after the key gate, so the identifier is the (validated) API key.
//! Successful responses get `X-RateLimit-*` headers stamped on the way out;
//! refusals return 429 with the window's reset time.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RateLimitInfo};

/// Identifier for requests that somehow lack a key (internal callers).
const ANONYMOUS: &str = "anonymous";

fn rate_key(req: &Request<axum::body::Body>) -> String {
    req.headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// Count the request against its key's window; 429 once over budget.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req);
    let per_minute = ctx.config.rate_limit_per_minute;

    // MutexGuard is !Send — drop before .await via block scope
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        if limiter.is_limited(&key, per_minute) {
            let info = limiter.info(&key, per_minute);
            tracing::warn!(remaining = info.remaining, "rate limit exceeded");
            return Err(ApiError::RateLimited(info));
        }
    }

    let mut response = next.run(req).await;

    let info = {
        let limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;
        limiter.info(&key, per_minute)
    };
    stamp_headers(&mut response, info);

    Ok(response)
}

fn stamp_headers(response: &mut Response, info: RateLimitInfo) {
    let headers = response.headers_mut();
    if let Ok(val) = HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", val);
    }
    if let Ok(val) = HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", val);
    }
    if let Ok(val) = HeaderValue::from_str(&info.reset_at_ms.to_string()) {
        headers.insert("X-RateLimit-Reset", val);
    }
}
