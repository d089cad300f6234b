//! `POST /api/v1/ocr-health` — health-device reading extraction from a
//! photo, plus best-effort archival of the scan.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::types::ApiContext;
use crate::ocr::health::{process_health_ocr, HealthOcrResult};
use crate::storage::{decode_data_url, object_key, HEALTH_SCAN_TABLE};

#[derive(Deserialize)]
pub struct HealthScanRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub add_from: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// Run health-device OCR on the posted base64 image, then archive the
/// image and scan record. Archival is observability only: its failures are
/// logged and the OCR result is returned regardless.
pub async fn scan(
    State(ctx): State<ApiContext>,
    Json(payload): Json<HealthScanRequest>,
) -> Response {
    let Some(image) = payload.image.as_deref().filter(|i| !i.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(HealthOcrResult::failed(
                "Missing image data",
                "Please provide an image in base64 format",
            )),
        )
            .into_response();
    };

    let result = match process_health_ocr(ctx.ocr_model.as_ref(), image).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "health OCR model call failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthOcrResult::failed(
                    "Internal server error",
                    "An error occurred while processing your request",
                )),
            )
                .into_response();
        }
    };

    archive_scan(&ctx, image, &payload, &result).await;

    Json(result).into_response()
}

/// Upload the image and insert the scan log row; never fails the request.
async fn archive_scan(
    ctx: &ApiContext,
    image: &str,
    payload: &HealthScanRequest,
    result: &HealthOcrResult,
) {
    let image_url = match decode_data_url(image) {
        Ok(decoded) => {
            let key = object_key(payload.country_code.as_deref(), &decoded.image_type);
            let content_type = decoded.content_type();
            match ctx.objects.upload(decoded.bytes, &content_type, &key).await {
                Ok(stored) => Some(stored),
                Err(e) => {
                    tracing::error!(error = %e, "scan image upload failed");
                    None
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "scan image decode failed");
            None
        }
    };

    let record = json!({
        "image_url": image_url.as_deref(),
        "ocr_result": result,
        "country_code": &payload.country_code,
        "device_type": &payload.device_type,
        "add_from": &payload.add_from,
        "ip_address": &payload.ip_address,
    });

    if let Err(e) = ctx.logs.insert(HEALTH_SCAN_TABLE, record).await {
        tracing::error!(error = %e, "scan log insert failed");
    } else if let Some(url) = image_url {
        tracing::info!(image_url = %url, "scan archived");
    }
}
