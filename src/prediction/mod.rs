//! Disease prediction: model loading, per-patient assessment and the
//! report kept in the session for PDF export.

pub mod classifier;
pub mod features;
pub mod risk;
pub mod training;

pub use classifier::{DiseaseClassifier, ModelError};
pub use risk::RiskBand;

use std::path::Path;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::model_path;
use crate::db::{self, DatabaseError};
use crate::generation::{suggest_treatment, TextGenerator};
use crate::models::{Disease, Patient};

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("No patient with ID {0}")]
    PatientNotFound(i64),

    #[error("No {} record found for patient ID {patient_id}", .disease.display_name())]
    RecordNotFound { disease: Disease, patient_id: i64 },

    #[error("Patient {0} has no recorded age")]
    MissingAge(i64),
}

/// The three classifiers, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub diabetes: DiseaseClassifier,
    pub heart_disease: DiseaseClassifier,
    pub parkinsons: DiseaseClassifier,
}

impl ModelSet {
    /// Load `<models_dir>/{diabetes,heart_disease,parkinsons}.json`.
    pub fn load(models_dir: &Path) -> Result<Self, ModelError> {
        let load = |disease: Disease| {
            let path = model_path(models_dir, disease.as_str());
            let model = DiseaseClassifier::load(&path, disease)?;
            tracing::info!(
                disease = disease.as_str(),
                features = model.feature_count(),
                accuracy = model.metadata.test_accuracy,
                "Model loaded"
            );
            Ok::<_, ModelError>(model)
        };
        Ok(Self {
            diabetes: load(Disease::Diabetes)?,
            heart_disease: load(Disease::HeartDisease)?,
            parkinsons: load(Disease::Parkinsons)?,
        })
    }

    pub fn get(&self, disease: Disease) -> &DiseaseClassifier {
        match disease {
            Disease::Diabetes => &self.diabetes,
            Disease::HeartDisease => &self.heart_disease,
            Disease::Parkinsons => &self.parkinsons,
        }
    }
}

// ═══════════════════════════════════════════
// Report types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub sex: Option<String>,
}

impl From<&Patient> for PatientSummary {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            age: p.age,
            sex: p.gender.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseAssessment {
    pub disease: Disease,
    pub prediction: u8,
    pub verdict: String,
    pub probability: f64,
    pub risk_band: RiskBand,
    pub treatment_suggestion: String,
}

impl DiseaseAssessment {
    /// e.g. "Risk of developing diabetes: 0.42 (Medium Risk)"
    pub fn risk_line(&self) -> String {
        format!(
            "Risk of developing {}: {:.2} ({})",
            self.disease.risk_subject(),
            self.probability,
            self.risk_band.label()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub patient: PatientSummary,
    pub assessments: Vec<DiseaseAssessment>,
    pub generated_at: String,
}

// ═══════════════════════════════════════════
// Assessment
// ═══════════════════════════════════════════

/// Classify one feature vector; the suggestion is filled in separately.
pub fn classify(
    model: &DiseaseClassifier,
    disease: Disease,
    features: &[f64],
) -> Result<(u8, f64, RiskBand), ModelError> {
    let prediction = model.predict(features)?;
    let probability = model.predict_proba(features)?;
    tracing::debug!(
        disease = disease.as_str(),
        prediction,
        probability,
        "Classified"
    );
    Ok((prediction, probability, RiskBand::from_probability(probability)))
}

/// Feature vectors for all three diseases, read from the clinical store.
pub fn gather_features(
    conn: &Connection,
    patient_id: i64,
) -> Result<(Patient, Vec<(Disease, Vec<f64>)>), PredictionError> {
    let patient = db::get_patient(conn, patient_id)?
        .ok_or(PredictionError::PatientNotFound(patient_id))?;

    let missing = |disease| PredictionError::RecordNotFound {
        disease,
        patient_id,
    };

    let diabetes = db::get_diabetes_record(conn, patient_id)?
        .ok_or_else(|| missing(Disease::Diabetes))?;
    let heart = db::get_heart_disease_record(conn, patient_id)?
        .ok_or_else(|| missing(Disease::HeartDisease))?;
    let parkinsons = db::get_parkinsons_record(conn, patient_id)?
        .ok_or_else(|| missing(Disease::Parkinsons))?;

    let vectors = vec![
        (
            Disease::Diabetes,
            features::diabetes_features(&diabetes.measurements, &patient)?,
        ),
        (
            Disease::HeartDisease,
            features::heart_disease_features(&heart.measurements, &patient)?,
        ),
        (
            Disease::Parkinsons,
            features::parkinsons_features(&parkinsons.measurements),
        ),
    ];
    Ok((patient, vectors))
}

/// Run all three classifiers for a patient and attach narrative suggestions.
///
/// Blocking: reads SQLite and may call the text generator.
pub fn assess_patient(
    conn: &Connection,
    models: &ModelSet,
    generator: &dyn TextGenerator,
    patient_id: i64,
) -> Result<PredictionReport, PredictionError> {
    let (patient, vectors) = gather_features(conn, patient_id)?;

    let mut assessments = Vec::with_capacity(vectors.len());
    for (disease, features) in vectors {
        let (prediction, probability, risk_band) = classify(models.get(disease), disease, &features)?;
        let treatment_suggestion = suggest_treatment(generator, disease, prediction == 1, risk_band);
        assessments.push(DiseaseAssessment {
            disease,
            prediction,
            verdict: disease.verdict(prediction == 1).to_string(),
            probability,
            risk_band,
            treatment_suggestion,
        });
    }

    tracing::info!(patient_id, "Prediction report generated");
    Ok(PredictionReport {
        patient: PatientSummary::from(&patient),
        assessments,
        generated_at: crate::db::timestamp_now(),
    })
}
