use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Diabetes,
    HeartDisease,
    Parkinsons,
}

impl Disease {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Diabetes => "diabetes",
            Disease::HeartDisease => "heart_disease",
            Disease::Parkinsons => "parkinsons",
        }
    }

    /// Every disease, in the order the prediction screen reports them.
    pub const ALL: [Disease; 3] = [Disease::Diabetes, Disease::HeartDisease, Disease::Parkinsons];

    /// Human-readable name used in prompts and the PDF report.
    pub fn display_name(&self) -> &'static str {
        match self {
            Disease::Diabetes => "Diabetes",
            Disease::HeartDisease => "Heart Disease",
            Disease::Parkinsons => "Parkinson's Disease",
        }
    }

    /// Name used inside the treatment-suggestion prompt.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Disease::Diabetes => "Diabetes",
            Disease::HeartDisease => "Heart Disease",
            Disease::Parkinsons => "Parkinsons",
        }
    }

    /// Subject of the "Risk of developing ..." line.
    pub fn risk_subject(&self) -> &'static str {
        match self {
            Disease::Diabetes => "diabetes",
            Disease::HeartDisease => "heart disease",
            Disease::Parkinsons => "Parkinsons",
        }
    }

    /// Verdict sentence for a 0/1 classifier output.
    pub fn verdict(&self, positive: bool) -> &'static str {
        match (self, positive) {
            (Disease::Diabetes, true) => "The patient is diabetic",
            (Disease::Diabetes, false) => "The patient is not diabetic",
            (Disease::HeartDisease, true) => {
                "The patient is having heart disease and is at risk of heart failure"
            }
            (Disease::HeartDisease, false) => "The patient does not have any heart disease",
            (Disease::Parkinsons, true) => "The patient has Parkinson's disease",
            (Disease::Parkinsons, false) => "The patient doesn't have Parkinson's disease",
        }
    }
}
