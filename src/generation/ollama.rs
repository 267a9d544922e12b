use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Ollama HTTP client for local text generation.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    temperature: f32,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Whether the configured model is pulled on the Ollama host.
    pub fn is_model_available(&self) -> Result<bool, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;
        Ok(parsed.models.iter().any(|m| m.name.starts_with(&self.model)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            GenerationError::Timeout(self.timeout_secs)
        } else {
            GenerationError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: max_tokens,
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock generator for testing: returns a configurable response and
/// records every prompt it receives.
pub struct MockGenerator {
    response: Result<String, String>,
    prompts: Mutex<Vec<(String, u32)>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, with their token budgets.
    pub fn prompts(&self) -> Vec<(String, u32)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), max_tokens));
        }
        self.response
            .clone()
            .map_err(GenerationError::HttpClient)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "llama3.2:1b", 5).unwrap();
        assert_eq!(generator.base_url, "http://localhost:11434");
        assert_eq!(generator.model_name(), "llama3.2:1b");
    }

    #[test]
    fn request_body_shape() {
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: OllamaOptions {
                num_predict: 50,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 50);
    }

    #[test]
    fn unreachable_host_is_connection_error() {
        // Port 9 (discard) on localhost is almost never listening
        let generator = OllamaGenerator::new("http://127.0.0.1:9", "m", 2).unwrap();
        let err = generator.generate("hi", 5).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::OllamaConnection(_) | GenerationError::HttpClient(_) | GenerationError::Timeout(_)
        ));
    }

    #[test]
    fn mock_records_prompts() {
        let mock = MockGenerator::new("ok");
        assert_eq!(mock.generate("first", 10).unwrap(), "ok");
        mock.generate("second", 20).unwrap();
        assert_eq!(
            mock.prompts(),
            vec![("first".to_string(), 10), ("second".to_string(), 20)]
        );
    }

    #[test]
    fn failing_mock_errors() {
        let mock = MockGenerator::failing("down");
        assert!(mock.generate("x", 1).is_err());
        assert_eq!(mock.prompts().len(), 1);
    }
}
