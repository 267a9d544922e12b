//! Patient Information endpoints.
//!
//! `POST /api/patients`: store a patient, returns the new id
//! `GET /api/patients/:id`: look one up

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db;
use crate::models::{Patient, PatientForm};

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(form): Json<PatientForm>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let store = ctx.clinical.clone();
    let id = run_blocking(move || {
        let conn = store.open()?;
        Ok(db::insert_patient(&conn, &form)?)
    })
    .await?;

    tracing::info!(patient_id = id, "Patient stored");
    Ok(Json(CreatedResponse {
        id,
        message: format!("Patient data saved successfully! Patient ID: {id}"),
    }))
}

/// `GET /api/patients/:id`: a lookup failure reads as "not found".
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let store = ctx.clinical.clone();
    let patient = run_blocking(move || {
        let found = store
            .open()
            .and_then(|conn| db::get_patient(&conn, id))
            .unwrap_or_else(|e| {
                tracing::error!(patient_id = id, error = %e, "Patient lookup failed");
                None
            });
        Ok(found)
    })
    .await?;

    patient
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No patient with ID {id}")))
}
