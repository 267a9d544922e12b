//! Disease Predictions endpoints.
//!
//! `POST /api/predictions`: run all three classifiers for a patient; the
//! report is kept in the caller's session
//! `GET /api/predictions/report.pdf`: that report as a PDF download

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, AuthenticatedUser};
use crate::prediction::{self, PredictionReport};
use crate::report;

#[derive(Deserialize)]
pub struct PredictionRequest {
    pub patient_id: i64,
}

/// `POST /api/predictions`
pub async fn predict(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<PredictionReport>, ApiError> {
    let store = ctx.clinical.clone();
    let models = ctx.models.clone();
    let generator = ctx.generator.clone();
    let report = run_blocking(move || {
        let conn = store.open()?;
        Ok(prediction::assess_patient(
            &conn,
            &models,
            generator.as_ref(),
            req.patient_id,
        )?)
    })
    .await?;

    let stored = report.clone();
    ctx.sessions
        .update(&user.token, move |session| session.last_report = Some(stored))?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(report))
}

/// `GET /api/predictions/report.pdf`
pub async fn report_pdf(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let last = ctx
        .sessions
        .get(&user.token)?
        .ok_or(ApiError::Unauthorized)?
        .last_report
        .ok_or_else(|| ApiError::NotFound("Run a prediction before downloading the report".into()))?;

    let bytes = run_blocking(move || Ok(report::render_report_pdf(&last)?)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report::REPORT_FILENAME),
            ),
        ],
        bytes,
    ))
}
