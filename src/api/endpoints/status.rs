//! `GET /api/health` — liveness probe.

use axum::Json;
use serde::Serialize;

use crate::config::APP_VERSION;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn check() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: APP_VERSION,
    })
}
