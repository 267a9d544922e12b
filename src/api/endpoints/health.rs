//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
    pub generator_model: String,
    pub active_sessions: usize,
}

/// `GET /api/health`: liveness check for the UI and scripts.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        app: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        generator_model: ctx.generator.model_name().to_string(),
        active_sessions: ctx.sessions.len(),
    }))
}
