//! Prompt templates for suggestions and the chatbot.

use crate::models::Disease;
use crate::prediction::RiskBand;

pub fn suggestion_prompt(disease: Disease, positive: bool, band: RiskBand) -> String {
    format!(
        "The patient's prediction for {} is {} and their risk level is {}. \
         Based on this, provide a recommendation on whether further testing is required.",
        disease.prompt_name(),
        if positive { "positive" } else { "negative" },
        band.label()
    )
}

pub fn general_chat_prompt(query: &str) -> String {
    format!("Patient's query: {}\nHealthcare advice:", query.trim())
}

/// Patient-specific prompt with the matching record embedded as text.
pub fn patient_chat_prompt(patient_id: i64, query: &str, record: &str) -> String {
    format!(
        "Patient ID: {patient_id}, Query: {}\nPatient Data: {record}\nHealthcare advice:",
        query.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_prompt_text() {
        let prompt = suggestion_prompt(Disease::HeartDisease, true, RiskBand::High);
        assert_eq!(
            prompt,
            "The patient's prediction for Heart Disease is positive and their risk level is High Risk. \
             Based on this, provide a recommendation on whether further testing is required."
        );
    }

    #[test]
    fn negative_prediction_wording() {
        let prompt = suggestion_prompt(Disease::Diabetes, false, RiskBand::Low);
        assert!(prompt.contains("for Diabetes is negative"));
        assert!(prompt.contains("Low Risk"));
    }

    #[test]
    fn chat_prompts() {
        assert_eq!(
            general_chat_prompt(" How much water should I drink? "),
            "Patient's query: How much water should I drink?\nHealthcare advice:"
        );
        let prompt = patient_chat_prompt(4, "Is the patient diabetic?", "Glucose: 148");
        assert_eq!(
            prompt,
            "Patient ID: 4, Query: Is the patient diabetic?\nPatient Data: Glucose: 148\nHealthcare advice:"
        );
    }
}
