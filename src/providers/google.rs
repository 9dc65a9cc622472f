/*!
 * Google web translation endpoint.
 *
 * Uses the keyless `translate_a/single` endpoint with `client=gtx`. The text
 * goes in the form body so long segments do not hit URL length limits.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{Provider, error_from_response, http_client};
use crate::errors::ProviderError;

/// Default endpoint of the free web translation API
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Google translation client
#[derive(Debug)]
pub struct Google {
    /// Base URL of the API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Query for one translation
#[derive(Debug, Clone)]
pub struct GoogleRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl Google {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        Self {
            base_url,
            client: http_client(timeout_secs),
        }
    }

    /// Send a translation request and return the raw JSON reply
    pub async fn complete(&self, request: GoogleRequest) -> Result<Value, ProviderError> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", request.source_language.as_str()),
                ("tl", request.target_language.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", request.text.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid Google response: {}", e)))
    }

    /// Join the translated sentence chunks of a reply
    pub fn extract_text(response: &Value) -> Option<String> {
        let sentences = response.get(0)?.as_array()?;
        let text: String = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .collect();
        Some(text)
    }
}

#[async_trait]
impl Provider for Google {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GoogleRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        let response = self.complete(request).await?;
        Self::extract_text(&response)
            .ok_or_else(|| ProviderError::ParseError("Google response has no sentences".to_string()))
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
