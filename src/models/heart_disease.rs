use serde::{Deserialize, Serialize};

use super::form::{
    parse_flag, parse_int, parse_real, FormError, LabelledValues, NewRecord, RawField,
};

/// Heart failure clinical record. Flags are stored as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartDiseaseMeasurements {
    pub anaemia: i64,
    /// Creatinine phosphokinase (mcg/L)
    pub creatine: i64,
    pub diabetes: i64,
    pub ejection_fraction: i64,
    /// High blood pressure
    pub bp: i64,
    /// Platelet count (kiloplatelets/mL)
    pub platelets: f64,
    pub serum_creatinine: f64,
    pub serum_sodium: i64,
    pub smoking: i64,
    /// Follow-up period in days
    pub follow_up: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartDiseaseRecord {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub measurements: HeartDiseaseMeasurements,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartDiseaseForm {
    pub patient_id: RawField,
    pub anaemia: RawField,
    pub creatine: RawField,
    pub diabetes: RawField,
    pub ejection_fraction: RawField,
    pub bp: RawField,
    pub platelets: RawField,
    pub serum_creatinine: RawField,
    pub serum_sodium: RawField,
    pub smoking: RawField,
    pub follow_up: RawField,
}

impl HeartDiseaseForm {
    pub fn parse(&self) -> Result<NewRecord<HeartDiseaseMeasurements>, FormError> {
        Ok(NewRecord {
            patient_id: parse_int("patient_id", &self.patient_id)?,
            measurements: HeartDiseaseMeasurements {
                anaemia: parse_flag("anaemia", &self.anaemia)?,
                creatine: parse_int("creatine", &self.creatine)?,
                diabetes: parse_flag("diabetes", &self.diabetes)?,
                ejection_fraction: parse_int("ejection_fraction", &self.ejection_fraction)?,
                bp: parse_flag("bp", &self.bp)?,
                platelets: parse_real("platelets", &self.platelets)?,
                serum_creatinine: parse_real("serum_creatinine", &self.serum_creatinine)?,
                serum_sodium: parse_int("serum_sodium", &self.serum_sodium)?,
                smoking: parse_flag("smoking", &self.smoking)?,
                follow_up: parse_int("follow_up", &self.follow_up)?,
            },
        })
    }
}

fn yes_no(flag: i64) -> String {
    if flag != 0 { "Yes" } else { "No" }.to_string()
}

impl LabelledValues for HeartDiseaseMeasurements {
    fn labelled_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Anaemia", yes_no(self.anaemia)),
            ("Creatinine Phosphokinase", self.creatine.to_string()),
            ("Diabetes", yes_no(self.diabetes)),
            ("Ejection Fraction", self.ejection_fraction.to_string()),
            ("High Blood Pressure", yes_no(self.bp)),
            ("Platelets", self.platelets.to_string()),
            ("Serum Creatinine", self.serum_creatinine.to_string()),
            ("Serum Sodium", self.serum_sodium.to_string()),
            ("Smoking", yes_no(self.smoking)),
            ("Follow-up Period (days)", self.follow_up.to_string()),
        ]
    }
}
