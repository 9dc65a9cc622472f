/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use xlifftr::app_config::{Config, LogLevel, TranslationProvider};
use xlifftr::translation::DocumentOptions;
use crate::common;

/// Test that a partial config file is completed with defaults
#[test]
fn test_fromJson_withPartialConfig_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "target_languages": ["fr", "de"],
        "translation": { "provider": "libretranslate" },
        "document": { "overwrite_source": true, "glossary_path": "terms.csv" },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_languages, vec!["fr", "de"]);
    assert_eq!(config.translation.provider, TranslationProvider::LibreTranslate);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:5000");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.document.overwrite_source);
    assert!(config.document.translate_notes);
    assert_eq!(config.document.glossary_path.as_deref(), Some("terms.csv"));
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test that a config written to disk loads back the same
#[test]
fn test_configFile_writtenThenRead_shouldKeepProviderSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.available_providers[3].model = "qwen2".to_string();
    config.translation.common.throttle_ms = 250;

    let path = common::create_test_file(temp_dir.path(), "conf.json", &serde_json::to_string_pretty(&config)?)?;
    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(loaded.translation.provider, TranslationProvider::Ollama);
    assert_eq!(loaded.translation.get_model(), "qwen2");
    assert_eq!(loaded.translation.common.throttle_ms, 250);
    Ok(())
}

/// Test the language checks of validate
#[test]
fn test_validate_withLanguages_shouldCheckCodes() {
    let mut config = common::test_config(&["en", "pt-BR", "zh_Hant"]);
    assert!(config.validate().is_ok());

    config.target_languages = vec!["auto".to_string()];
    assert!(config.validate().is_err());

    config.target_languages = Vec::new();
    assert!(config.validate().is_err());

    config.target_languages = vec!["en".to_string()];
    config.source_language = "xx-invalid-".to_string();
    assert!(config.validate().is_err());
}

/// Test that DeepL accepts a key from the config file
#[test]
fn test_validate_withDeepLKeyInConfig_shouldPass() {
    let mut config = common::test_config(&["en"]);
    config.translation.provider = TranslationProvider::DeepL;
    config.translation.available_providers[1].api_key = "abc:fx".to_string();
    assert!(config.validate().is_ok());
}

/// Test that a broken endpoint is rejected
#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = common::test_config(&["en"]);
    config.translation.available_providers[0].endpoint = "http://exa mple.com".to_string();
    assert!(config.validate().is_err());
}

/// Test that document options mirror the config
#[test]
fn test_documentOptions_fromConfig_shouldCopyDocumentSection() {
    let mut config = common::test_config(&["en"]);
    config.document.translate_attributes = false;
    config.document.stamp_target_language = false;

    let options = DocumentOptions::from_config(&config);
    assert_eq!(options.source_language, "pt");
    assert!(!options.translate_attributes);
    assert!(!options.stamp_target_language);
    assert!(options.translate_notes);
}
