use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

use crate::language_utils;
use crate::xliff::walker::DEFAULT_ATTRIBUTES;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), or `auto`
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language codes, one output document per entry
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Document handling
    #[serde(default)]
    pub document: DocumentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google web endpoint
    #[default]
    Google,
    // @provider: DeepL
    DeepL,
    // @provider: LibreTranslate
    LibreTranslate,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::DeepL => "DeepL",
            Self::LibreTranslate => "LibreTranslate",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Environment variable consulted when the config has no key
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::DeepL => Some("DEEPL_API_KEY"),
            Self::LibreTranslate => Some("LIBRETRANSLATE_API_KEY"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::DeepL),
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Configuration for one provider entry in `available_providers`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type (google, deepl, libretranslate, ollama)
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model name, only used by LLM providers
    #[serde(default)]
    pub model: String,

    /// API key; empty means "read from the environment"
    #[serde(default)]
    pub api_key: String,

    /// Service endpoint URL; empty means the provider default
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn new(provider_type: TranslationProvider) -> Self {
        let model = match provider_type {
            TranslationProvider::Ollama => default_ollama_model(),
            _ => String::new(),
        };
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM providers
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Delay in milliseconds between consecutive provider calls
    #[serde(default)]
    pub throttle_ms: u64,

    /// Reuse translations of identical texts within a run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            throttle_ms: 0,
            cache_enabled: true,
            temperature: default_temperature(),
        }
    }
}

/// How documents are rewritten
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Also replace the source text with the translation
    #[serde(default)]
    pub overwrite_source: bool,

    /// Translate `note` elements
    #[serde(default = "default_true")]
    pub translate_notes: bool,

    /// Translate accessibility attributes
    #[serde(default = "default_true")]
    pub translate_attributes: bool,

    /// Attribute names treated as translatable
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,

    /// Repair spacing around inline tags after translation
    #[serde(default = "default_true")]
    pub normalize_spacing: bool,

    /// Write the target language into `target-language` / `trgLang`
    #[serde(default = "default_true")]
    pub stamp_target_language: bool,

    /// Glossary CSV file
    #[serde(default)]
    pub glossary_path: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            overwrite_source: false,
            translate_notes: true,
            translate_attributes: true,
            attributes: default_attributes(),
            normalize_spacing: true,
            stamp_target_language: true,
            glossary_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_attributes() -> Vec<String> {
    DEFAULT_ATTRIBUTES.iter().map(|name| name.to_string()).collect()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Google => crate::providers::google::DEFAULT_ENDPOINT.to_string(),
        // DeepL picks its host from the key tier
        TranslationProvider::DeepL => String::new(),
        TranslationProvider::LibreTranslate => {
            crate::providers::libretranslate::DEFAULT_ENDPOINT.to_string()
        }
        TranslationProvider::Ollama => crate::providers::ollama::DEFAULT_ENDPOINT.to_string(),
    }
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language}. Only respond with the translated text.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.source_language.eq_ignore_ascii_case("auto") {
            language_utils::validate_language_code(&self.source_language)
                .map_err(|e| anyhow!("Invalid source language: {}", e))?;
        }

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for target in &self.target_languages {
            if target.eq_ignore_ascii_case("auto") {
                return Err(anyhow!("'auto' is only allowed as the source language"));
            }
            language_utils::validate_language_code(target)
                .map_err(|e| anyhow!("Invalid target language: {}", e))?;
        }

        if self.translation.provider == TranslationProvider::DeepL
            && self.translation.get_api_key().is_none()
        {
            return Err(anyhow!(
                "Translation API key is required for DeepL provider (config or DEEPL_API_KEY)"
            ));
        }

        let endpoint = self.translation.get_endpoint();
        if !endpoint.is_empty() {
            let candidate = if endpoint.contains("://") {
                endpoint.clone()
            } else {
                format!("http://{}", endpoint)
            };
            Url::parse(&candidate)
                .map_err(|e| anyhow!("Invalid endpoint '{}' for {}: {}", endpoint, self.translation.provider, e))?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            translation: TranslationConfig::default(),
            document: DocumentConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type.eq_ignore_ascii_case(&provider_str))
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            _ => String::new(),
        }
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return Some(provider_config.api_key.clone());
            }
        }

        self.provider
            .api_key_env()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => default_timeout_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Google),
                ProviderConfig::new(TranslationProvider::DeepL),
                ProviderConfig::new(TranslationProvider::LibreTranslate),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
