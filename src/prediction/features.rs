//! Feature-vector assembly from stored records.
//!
//! Column order matches the public training datasets exactly; the names
//! below double as the CSV headers the `train` command selects.

use crate::models::{
    DiabetesMeasurements, HeartDiseaseMeasurements, ParkinsonsMeasurements, Patient,
    PARKINSONS_LABELS,
};

use super::PredictionError;

pub const DIABETES_FEATURES: &[&str] = &[
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

pub const HEART_DISEASE_FEATURES: &[&str] = &[
    "age",
    "anaemia",
    "creatinine_phosphokinase",
    "diabetes",
    "ejection_fraction",
    "high_blood_pressure",
    "platelets",
    "serum_creatinine",
    "serum_sodium",
    "sex",
    "smoking",
    "time",
];

pub fn parkinsons_feature_names() -> &'static [&'static str] {
    PARKINSONS_LABELS
}

fn patient_age(patient: &Patient) -> Result<f64, PredictionError> {
    patient
        .age
        .map(|a| a as f64)
        .ok_or(PredictionError::MissingAge(patient.id))
}

/// The seven stored measurements, then the patient's age.
pub fn diabetes_features(
    m: &DiabetesMeasurements,
    patient: &Patient,
) -> Result<Vec<f64>, PredictionError> {
    Ok(vec![
        m.pregnancies as f64,
        m.glucose as f64,
        m.blood_pressure as f64,
        m.skin_thickness as f64,
        m.insulin as f64,
        m.bmi,
        m.diabetes_pedigree,
        patient_age(patient)?,
    ])
}

/// Age first, sex joined from the patient between sodium and smoking.
pub fn heart_disease_features(
    m: &HeartDiseaseMeasurements,
    patient: &Patient,
) -> Result<Vec<f64>, PredictionError> {
    Ok(vec![
        patient_age(patient)?,
        m.anaemia as f64,
        m.creatine as f64,
        m.diabetes as f64,
        m.ejection_fraction as f64,
        m.bp as f64,
        m.platelets,
        m.serum_creatinine,
        m.serum_sodium as f64,
        patient.sex_code() as f64,
        m.smoking as f64,
        m.follow_up as f64,
    ])
}

pub fn parkinsons_features(m: &ParkinsonsMeasurements) -> Vec<f64> {
    m.values()
}
