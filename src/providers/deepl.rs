/*!
 * DeepL API client.
 *
 * Keys ending in `:fx` belong to the free tier, which is served from a
 * separate host.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Provider, error_from_response, http_client};
use crate::errors::ProviderError;
use crate::language_utils;

pub const PRO_ENDPOINT: &str = "https://api.deepl.com";
pub const FREE_ENDPOINT: &str = "https://api-free.deepl.com";

/// DeepL client
#[derive(Debug)]
pub struct DeepL {
    api_key: String,
    base_url: String,
    client: Client,
}

/// Body of `POST /v2/translate`
#[derive(Debug, Serialize)]
pub struct DeepLRequest {
    pub text: Vec<String>,
    pub target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,
}

impl DeepLRequest {
    /// Build a request, mapping codes to DeepL's upper-case form
    pub fn new(text: &str, source_language: &str, target_language: &str) -> Self {
        let source_lang = if source_language.eq_ignore_ascii_case("auto") {
            None
        } else {
            // Source languages never carry a region
            Some(language_utils::base_language(source_language).to_uppercase())
        };
        Self {
            text: vec![text.to_string()],
            target_lang: target_language.to_uppercase(),
            source_lang,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

impl DeepL {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let api_key = api_key.into();
        let endpoint = endpoint.into();
        let base_url = if !endpoint.trim().is_empty() {
            endpoint.trim_end_matches('/').to_string()
        } else if api_key.ends_with(":fx") {
            FREE_ENDPOINT.to_string()
        } else {
            PRO_ENDPOINT.to_string()
        };
        Self {
            api_key,
            base_url,
            client: http_client(timeout_secs),
        }
    }

    pub async fn complete(&self, request: DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        let url = format!("{}/v2/translate", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid DeepL response: {}", e)))
    }

    pub fn extract_text(response: &DeepLResponse) -> Option<String> {
        response.translations.first().map(|t| t.text.clone())
    }
}

#[async_trait]
impl Provider for DeepL {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .complete(DeepLRequest::new(text, source_language, target_language))
            .await?;
        Self::extract_text(&response)
            .ok_or_else(|| ProviderError::ParseError("DeepL returned no translations".to_string()))
    }

    fn name(&self) -> &'static str {
        "deepl"
    }
}
