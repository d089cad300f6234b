//! `POST /api/v1/health-advice` — combined advice over client-aggregated
//! health metrics.

use axum::extract::State;
use axum::Json;

use crate::advice::{generate_health_advice, AdviceOutcome, HealthAdviceRequest};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Validate the request, then generate advice.
///
/// AI failures do not error: the outcome body carries `success: false`
/// with an `AI_ERROR` code at HTTP 200.
pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(request): Json<HealthAdviceRequest>,
) -> Result<Json<AdviceOutcome>, ApiError> {
    if !request
        .device_id
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty())
    {
        return Err(ApiError::MissingDeviceId);
    }

    let Some(health_data) = request.health_data.as_ref() else {
        return Err(ApiError::MissingHealthData);
    };

    if !health_data.has_analyzable_data() {
        return Err(ApiError::NoAnalyzableData);
    }

    let outcome = generate_health_advice(
        ctx.advice_model.as_ref(),
        request.language.as_deref(),
        request.user_profile.as_ref(),
        health_data,
    )
    .await;

    Ok(Json(outcome))
}
