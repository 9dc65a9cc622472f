/*!
 * Ollama client.
 *
 * Translation runs through `/api/generate` with a system prompt that tells
 * the model to translate and to copy private-use tokens unchanged.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, error_from_response, http_client};
use crate::errors::ProviderError;
use crate::language_utils;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Appended to every system prompt
const TOKEN_INSTRUCTION: &str = "The text contains placeholder tokens made of private-use \
characters around a number. Copy every token exactly as it appears, keep each one exactly \
once, and do not translate, move outside the sentence, or remove them.";

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used for translation
    model: String,
    /// Prompt template with `{source_language}` and `{target_language}`
    system_prompt: String,
    temperature: f32,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }
}

impl Ollama {
    /// Create a client from a base URL; an empty URL means the local default
    pub fn from_url(url: impl Into<String>, timeout_secs: u64) -> Self {
        let url = url.into();
        let base_url = if url.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else if url.starts_with("http://") || url.starts_with("https://") {
            url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", url.trim_end_matches('/'))
        };
        Self {
            base_url,
            client: http_client(timeout_secs),
            model: String::new(),
            system_prompt: String::new(),
            temperature: 0.3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fill the prompt template for a language pair
    pub fn build_system_prompt(&self, source_language: &str, target_language: &str) -> String {
        let source = if source_language.eq_ignore_ascii_case("auto") {
            "the source language".to_string()
        } else {
            language_utils::get_language_name(source_language)
                .unwrap_or_else(|_| source_language.to_string())
        };
        let target = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());

        let template = if self.system_prompt.trim().is_empty() {
            "You are a professional translator. Translate the following text from \
             {source_language} to {target_language}. Only respond with the translated text."
        } else {
            self.system_prompt.as_str()
        };
        format!(
            "{} {}",
            template
                .replace("{source_language}", &source)
                .replace("{target_language}", &target),
            TOKEN_INSTRUCTION
        )
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let response_text = response.text().await?;
        Self::parse_generation(&response_text)
    }

    /// Parse a reply that is either one JSON object or JSON lines from a
    /// streamed generation
    fn parse_generation(response_text: &str) -> Result<GenerationResponse, ProviderError> {
        match serde_json::from_str::<GenerationResponse>(response_text) {
            Ok(generated) => Ok(generated),
            Err(e) => {
                let mut full_response = String::new();
                let mut parsed_any = false;
                for line in response_text.lines().filter(|line| !line.trim().is_empty()) {
                    if let Ok(chunk) = serde_json::from_str::<GenerationResponse>(line) {
                        full_response.push_str(&chunk.response);
                        parsed_any = true;
                    }
                }
                if parsed_any {
                    return Ok(GenerationResponse {
                        model: String::new(),
                        response: full_response,
                        done: true,
                    });
                }
                error!(
                    "Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                );
                Err(ProviderError::ParseError(format!("Invalid Ollama response: {}", e)))
            }
        }
    }

    /// Get the Ollama server version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let value: serde_json::Value = response.json().await?;
        value["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(self.build_system_prompt(source_language, target_language))
            .temperature(self.temperature);
        let response = self.generate(request).await?;
        Ok(response.response.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
