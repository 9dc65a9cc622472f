/*!
 * LibreTranslate client.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, error_from_response, http_client};
use crate::errors::ProviderError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Debug)]
pub struct LibreTranslate {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

/// Body of `POST /translate`
#[derive(Debug, Serialize)]
pub struct LibreTranslateRequest {
    pub q: String,
    pub source: String,
    pub target: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: Option<String>,
    pub error: Option<String>,
}

impl LibreTranslate {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        Self {
            base_url,
            api_key: api_key.filter(|key| !key.is_empty()),
            client: http_client(timeout_secs),
        }
    }

    pub async fn complete(
        &self,
        request: LibreTranslateRequest,
    ) -> Result<LibreTranslateResponse, ProviderError> {
        let url = format!("{}/translate", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid LibreTranslate response: {}", e)))
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = LibreTranslateRequest {
            q: text.to_string(),
            source: source_language.to_string(),
            target: target_language.to_string(),
            format: "text".to_string(),
            api_key: self.api_key.clone(),
        };
        let response = self.complete(request).await?;
        match (response.translated_text, response.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(ProviderError::ApiError {
                status_code: 200,
                message: error,
            }),
            (None, None) => Err(ProviderError::ParseError(
                "LibreTranslate response has no translatedText".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "libretranslate"
    }
}
