//! `POST /api/v1/health-summary` — combined summary over client-aggregated
//! metrics and/or a free-text note, plus best-effort logging.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::advice::{generate_health_summary, HealthData, HealthSummaryRequest, SummaryOutcome};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::storage::HEALTH_SUMMARY_TABLE;

/// Validate the request, generate the summary, and log the exchange.
pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(request): Json<HealthSummaryRequest>,
) -> Result<Json<SummaryOutcome>, ApiError> {
    if !request
        .device_id
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty())
    {
        return Err(ApiError::MissingDeviceId);
    }

    let empty = HealthData::default();
    let health_data = request.health_data.as_ref().unwrap_or(&empty);
    let has_note = request
        .custom_note
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());

    if !health_data.has_analyzable_data() && !has_note {
        return Err(ApiError::NoAnalyzableData);
    }

    let outcome = generate_health_summary(
        ctx.advice_model.as_ref(),
        request.language.as_deref(),
        request.user_profile.as_ref(),
        health_data,
        request.custom_note.as_deref(),
    )
    .await;

    log_summary(&ctx, &request, &outcome).await;

    Ok(Json(outcome))
}

/// Insert the summary log row; never fails the request.
async fn log_summary(ctx: &ApiContext, request: &HealthSummaryRequest, outcome: &SummaryOutcome) {
    let record = json!({
        "health_data": &request.health_data,
        "user_profile": &request.user_profile,
        "custom_note": &request.custom_note,
        "summary_result": outcome,
        "device_id": &request.device_id,
        "remaining_credits": &request.remaining_credits,
        "ip_address": &request.ip_address,
        "country_code": &request.country_code,
        "client_info": &request.client_info,
    });

    if let Err(e) = ctx.logs.insert(HEALTH_SUMMARY_TABLE, record).await {
        tracing::error!(error = %e, "summary log insert failed");
    }
}
