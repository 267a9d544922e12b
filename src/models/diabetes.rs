use serde::{Deserialize, Serialize};

use super::form::{
    parse_int, parse_int_or, parse_real, FormError, LabelledValues, NewRecord, RawField,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesMeasurements {
    pub pregnancies: i64,
    pub glucose: i64,
    pub blood_pressure: i64,
    pub skin_thickness: i64,
    pub insulin: i64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesRecord {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub measurements: DiabetesMeasurements,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiabetesForm {
    pub patient_id: RawField,
    pub pregnancies: RawField,
    pub glucose: RawField,
    pub blood_pressure: RawField,
    pub skin_thickness: RawField,
    pub insulin: RawField,
    pub bmi: RawField,
    pub diabetes_pedigree: RawField,
}

impl DiabetesForm {
    pub fn parse(&self) -> Result<NewRecord<DiabetesMeasurements>, FormError> {
        Ok(NewRecord {
            patient_id: parse_int("patient_id", &self.patient_id)?,
            measurements: DiabetesMeasurements {
                // Hidden for male patients in the UI, so blank means none
                pregnancies: parse_int_or("pregnancies", &self.pregnancies, 0)?,
                glucose: parse_int("glucose", &self.glucose)?,
                blood_pressure: parse_int("blood_pressure", &self.blood_pressure)?,
                skin_thickness: parse_int("skin_thickness", &self.skin_thickness)?,
                insulin: parse_int("insulin", &self.insulin)?,
                bmi: parse_real("bmi", &self.bmi)?,
                diabetes_pedigree: parse_real("diabetes_pedigree", &self.diabetes_pedigree)?,
            },
        })
    }
}

impl LabelledValues for DiabetesMeasurements {
    fn labelled_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Pregnancies", self.pregnancies.to_string()),
            ("Glucose", self.glucose.to_string()),
            ("Blood Pressure", self.blood_pressure.to_string()),
            ("Skin Thickness", self.skin_thickness.to_string()),
            ("Insulin", self.insulin.to_string()),
            ("BMI", self.bmi.to_string()),
            ("Diabetes Pedigree Function", self.diabetes_pedigree.to_string()),
        ]
    }
}
