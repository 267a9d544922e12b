//! Narrative text generation.
//!
//! Suggestions and chatbot replies come from a general-purpose language
//! model behind the [`TextGenerator`] trait. Output is decorative: a
//! generation failure never fails the request that asked for it.

pub mod ollama;
pub mod postprocess;
pub mod prompt;

pub use ollama::{MockGenerator, OllamaGenerator};

use thiserror::Error;

use crate::models::Disease;
use crate::prediction::RiskBand;

/// Token budget for a treatment suggestion.
pub const SUGGESTION_MAX_TOKENS: u32 = 50;

/// Token budget for a chatbot reply.
pub const CHAT_MAX_TOKENS: u32 = 150;

/// Used whenever a suggestion could not be generated.
pub const SUGGESTION_UNAVAILABLE: &str =
    "Treatment suggestion unavailable at the moment; please review the result with a clinician.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Cannot connect to Ollama at {0}")]
    OllamaConnection(String),

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Ollama returned {status}: {body}")]
    OllamaError { status: u16, body: String },

    #[error("Failed to parse generator response: {0}")]
    ResponseParsing(String),
}

/// A blocking text generator. Implementations must be callable from
/// `spawn_blocking` worker threads.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str;
}

/// Short recommendation on further testing for one assessment.
pub fn suggest_treatment(
    generator: &dyn TextGenerator,
    disease: Disease,
    positive: bool,
    band: RiskBand,
) -> String {
    let prompt = prompt::suggestion_prompt(disease, positive, band);
    match generator.generate(&prompt, SUGGESTION_MAX_TOKENS) {
        Ok(raw) => {
            let cleaned = postprocess::clean_suggestion(&prompt, &raw);
            if cleaned.is_empty() {
                tracing::warn!(disease = disease.as_str(), "Empty suggestion, using fallback");
                SUGGESTION_UNAVAILABLE.to_string()
            } else {
                cleaned
            }
        }
        Err(e) => {
            tracing::warn!(
                disease = disease.as_str(),
                model = generator.model_name(),
                error = %e,
                "Suggestion generation failed"
            );
            SUGGESTION_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_is_cleaned() {
        let mock = MockGenerator::new("Yes, further testing is needed. Book a test. Also rest");
        let out = suggest_treatment(&mock, Disease::Diabetes, true, RiskBand::High);
        assert_eq!(out, "Yes, further testing is needed. Book a test.");

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("for Diabetes is positive"));
        assert_eq!(prompts[0].1, SUGGESTION_MAX_TOKENS);
    }

    #[test]
    fn failure_falls_back() {
        let mock = MockGenerator::failing("connection refused");
        let out = suggest_treatment(&mock, Disease::Parkinsons, false, RiskBand::Low);
        assert_eq!(out, SUGGESTION_UNAVAILABLE);
    }

    #[test]
    fn blank_output_falls_back() {
        let mock = MockGenerator::new("   ");
        let out = suggest_treatment(&mock, Disease::HeartDisease, false, RiskBand::Medium);
        assert_eq!(out, SUGGESTION_UNAVAILABLE);
        assert!(out.ends_with('.'));
    }
}
