//! API error taxonomy with `{success, error, message}` JSON bodies.
//!
//! Only gate, limit, and request-validation failures become non-200
//! statuses. AI and parsing failures never reach this type — they degrade
//! inside the OCR/advice layers into renderable bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::types::RateLimitInfo;

/// Structured error body shared by every non-200 response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "resetTime", skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid or missing API key")]
    Unauthorized,
    #[error("Rate limit exceeded")]
    RateLimited(RateLimitInfo),
    #[error("device_id is required")]
    MissingDeviceId,
    #[error("health_data is required")]
    MissingHealthData,
    #[error("no analyzable health data provided")]
    NoAnalyzableData,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, reset_time) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or missing API key. Provide a valid key in the x-api-key header."
                    .to_string(),
                None,
            ),
            ApiError::RateLimited(info) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                "Too many requests. Please try again later.".to_string(),
                Some(info.reset_rfc3339()),
            ),
            ApiError::MissingDeviceId => (
                StatusCode::BAD_REQUEST,
                "MISSING_DEVICE_ID",
                "device_id is required".to_string(),
                None,
            ),
            ApiError::MissingHealthData => (
                StatusCode::BAD_REQUEST,
                "MISSING_HEALTH_DATA",
                "health_data is required".to_string(),
                None,
            ),
            ApiError::NoAnalyzableData => (
                StatusCode::BAD_REQUEST,
                "NO_ANALYZABLE_DATA",
                "No health data or custom note provided".to_string(),
                None,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An error occurred while processing your request".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: code,
            message,
            reset_time,
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited(info) = &self {
            let headers = response.headers_mut();
            if let Ok(val) = axum::http::HeaderValue::from_str(&info.limit.to_string()) {
                headers.insert("X-RateLimit-Limit", val);
            }
            headers.insert(
                "X-RateLimit-Remaining",
                axum::http::HeaderValue::from_static("0"),
            );
            if let Ok(val) = axum::http::HeaderValue::from_str(&info.reset_at_ms.to_string()) {
                headers.insert("X-RateLimit-Reset", val);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RateLimitInfo;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "UNAUTHORIZED");
        assert!(json["message"].as_str().unwrap().contains("x-api-key"));
    }

    #[tokio::test]
    async fn rate_limited_returns_429_with_reset() {
        let info = RateLimitInfo {
            limit: 10,
            remaining: 0,
            reset_at_ms: 1_700_000_000_000,
        };
        let response = ApiError::RateLimited(info).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("X-RateLimit-Limit").unwrap(), "10");
        assert_eq!(response.headers().get("X-RateLimit-Remaining").unwrap(), "0");
        assert_eq!(
            response.headers().get("X-RateLimit-Reset").unwrap(),
            "1700000000000"
        );

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(json["resetTime"], "2023-11-14T22:13:20.000Z");
    }

    #[tokio::test]
    async fn validation_errors_return_400_codes() {
        for (err, code) in [
            (ApiError::MissingDeviceId, "MISSING_DEVICE_ID"),
            (ApiError::MissingHealthData, "MISSING_HEALTH_DATA"),
            (ApiError::NoAnalyzableData, "NO_ANALYZABLE_DATA"),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = to_bytes(response.into_body(), 1024).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], code);
        }
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("db exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INTERNAL_ERROR");
        assert!(!json["message"].as_str().unwrap().contains("db exploded"));
    }

    #[tokio::test]
    async fn non_429_has_no_reset_time() {
        let response = ApiError::Unauthorized.into_response();
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("resetTime").is_none());
    }
}
