/*!
 * Provider implementations for machine translation services.
 *
 * This module contains client implementations for the supported services:
 * - Google: free web translation endpoint
 * - DeepL: DeepL API (free and pro tiers)
 * - LibreTranslate: self-hosted or public LibreTranslate servers
 * - Ollama: local LLM server
 * - Mock: deterministic provider for tests and benchmarks
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Providers receive text whose protected spans are already replaced by
/// private-use tokens and must return the translation as plain text.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate one text
    ///
    /// # Arguments
    /// * `text` - Text to translate, tokens included
    /// * `source_language` - Source language code, or `auto`
    /// * `target_language` - Target language code
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.translate("Hello", "en", "fr").await.map(|_| ())
    }

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

/// Build the HTTP client shared by one provider
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Turn a non-success response into a provider error
pub(crate) async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    ProviderError::from_status(status, body)
}

/// Create the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Result<Box<dyn Provider>> {
    let timeout = config.get_timeout_secs();
    let provider: Box<dyn Provider> = match config.provider {
        TranslationProvider::Google => Box::new(google::Google::new(config.get_endpoint(), timeout)),
        TranslationProvider::DeepL => {
            let api_key = config
                .get_api_key()
                .context("DeepL requires an API key (config or DEEPL_API_KEY)")?;
            Box::new(deepl::DeepL::new(api_key, config.get_endpoint(), timeout))
        }
        TranslationProvider::LibreTranslate => Box::new(libretranslate::LibreTranslate::new(
            config.get_endpoint(),
            config.get_api_key(),
            timeout,
        )),
        TranslationProvider::Ollama => Box::new(
            ollama::Ollama::from_url(config.get_endpoint(), timeout)
                .with_model(config.get_model())
                .with_system_prompt(&config.common.system_prompt)
                .with_temperature(config.common.temperature),
        ),
    };
    Ok(provider)
}

pub mod deepl;
pub mod google;
pub mod libretranslate;
pub mod mock;
pub mod ollama;
