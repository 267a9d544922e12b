//! Health record endpoints, one pair per disease.
//!
//! `POST /api/records/{diabetes,heart-disease,parkinsons}`: store a record
//! `GET /api/records/{diabetes,heart-disease,parkinsons}/:patient_id`: first stored record

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext};
use crate::db;
use crate::models::{
    DiabetesForm, DiabetesRecord, Disease, HeartDiseaseForm, HeartDiseaseRecord, ParkinsonsForm,
    ParkinsonsRecord,
};

#[derive(Serialize)]
pub struct RecordCreatedResponse {
    pub id: i64,
    pub disease: Disease,
    pub message: String,
}

fn created(disease: Disease, id: i64) -> Json<RecordCreatedResponse> {
    tracing::info!(disease = disease.as_str(), record_id = id, "Health record stored");
    Json(RecordCreatedResponse {
        id,
        disease,
        message: format!("{} data saved successfully!", disease.display_name()),
    })
}

fn not_found(disease: Disease, patient_id: i64) -> ApiError {
    ApiError::NotFound(format!(
        "No {} record found for patient ID {patient_id}",
        disease.display_name()
    ))
}

/// `POST /api/records/diabetes`
pub async fn create_diabetes(
    State(ctx): State<ApiContext>,
    Json(form): Json<DiabetesForm>,
) -> Result<Json<RecordCreatedResponse>, ApiError> {
    let store = ctx.clinical.clone();
    let id = run_blocking(move || Ok(db::insert_diabetes_record(&store.open()?, &form)?)).await?;
    Ok(created(Disease::Diabetes, id))
}

/// `GET /api/records/diabetes/:patient_id`
pub async fn get_diabetes(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<DiabetesRecord>, ApiError> {
    let store = ctx.clinical.clone();
    run_blocking(move || Ok(db::get_diabetes_record(&store.open()?, patient_id)?))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(Disease::Diabetes, patient_id))
}

/// `POST /api/records/heart-disease`
pub async fn create_heart_disease(
    State(ctx): State<ApiContext>,
    Json(form): Json<HeartDiseaseForm>,
) -> Result<Json<RecordCreatedResponse>, ApiError> {
    let store = ctx.clinical.clone();
    let id =
        run_blocking(move || Ok(db::insert_heart_disease_record(&store.open()?, &form)?)).await?;
    Ok(created(Disease::HeartDisease, id))
}

/// `GET /api/records/heart-disease/:patient_id`
pub async fn get_heart_disease(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<HeartDiseaseRecord>, ApiError> {
    let store = ctx.clinical.clone();
    run_blocking(move || Ok(db::get_heart_disease_record(&store.open()?, patient_id)?))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(Disease::HeartDisease, patient_id))
}

/// `POST /api/records/parkinsons`
pub async fn create_parkinsons(
    State(ctx): State<ApiContext>,
    Json(form): Json<ParkinsonsForm>,
) -> Result<Json<RecordCreatedResponse>, ApiError> {
    let store = ctx.clinical.clone();
    let id = run_blocking(move || Ok(db::insert_parkinsons_record(&store.open()?, &form)?)).await?;
    Ok(created(Disease::Parkinsons, id))
}

/// `GET /api/records/parkinsons/:patient_id`
pub async fn get_parkinsons(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<ParkinsonsRecord>, ApiError> {
    let store = ctx.clinical.clone();
    run_blocking(move || Ok(db::get_parkinsons_record(&store.open()?, patient_id)?))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(Disease::Parkinsons, patient_id))
}
