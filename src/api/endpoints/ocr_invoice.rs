//! `POST /api/v1/ocr-invoice` — invoice line-item extraction from a photo.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::api::types::ApiContext;
use crate::ocr::invoice::{process_invoice_ocr, InvoiceOcrResult};

#[derive(Deserialize)]
pub struct InvoiceScanRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Run invoice OCR on the posted base64 image.
///
/// Failure bodies keep the `InvoiceOcrResult` shape so clients render one
/// schema for every outcome.
pub async fn scan(
    State(ctx): State<ApiContext>,
    Json(payload): Json<InvoiceScanRequest>,
) -> Response {
    let Some(image) = payload.image.filter(|i| !i.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(InvoiceOcrResult::failed(
                "Missing image data",
                "Please provide an image in base64 format",
            )),
        )
            .into_response();
    };

    match process_invoice_ocr(ctx.ocr_model.as_ref(), &image).await {
        Ok(result) => {
            tracing::info!(items = result.items.len(), "invoice OCR complete");
            Json(result).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "invoice OCR model call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(InvoiceOcrResult::failed(
                    "Internal server error",
                    "An error occurred while processing your request",
                )),
            )
                .into_response()
        }
    }
}
