/*!
 * Tests for the translation service: cache, throttling and token checks
 */

use std::time::{Duration, Instant};
use xlifftr::app_config::TranslationConfig;
use xlifftr::errors::TranslationError;
use xlifftr::providers::mock::MockProvider;
use xlifftr::translation::{TextOutcome, TranslationService};

fn service_with(provider: MockProvider, config: TranslationConfig) -> TranslationService {
    TranslationService::with_provider(Box::new(provider), config)
}

/// Test that repeated texts hit the cache instead of the provider
#[tokio::test]
async fn test_translateText_withRepeatedText_shouldCallProviderOnce() {
    let provider = MockProvider::uppercase();
    let service = service_with(provider.clone(), TranslationConfig::default());

    for _ in 0..3 {
        assert_eq!(service.translate_text("bom dia", "pt", "en").await.unwrap(), "BOM DIA");
    }
    // Another language pair is a different cache entry
    service.translate_text("bom dia", "pt", "fr").await.unwrap();

    let stats = service.stats();
    assert_eq!(provider.request_count(), 2);
    assert_eq!(stats.attempted, 2);
    assert_eq!(stats.cache_hits, 2);
}

/// Test that the cache can be disabled
#[tokio::test]
async fn test_translateText_withCacheDisabled_shouldAlwaysCallProvider() {
    let provider = MockProvider::echo();
    let mut config = TranslationConfig::default();
    config.common.cache_enabled = false;
    let service = service_with(provider.clone(), config);

    service.translate_text("a b", "en", "fr").await.unwrap();
    service.translate_text("a b", "en", "fr").await.unwrap();
    assert_eq!(provider.request_count(), 2);
}

/// Test that the throttle spaces out provider calls
#[tokio::test]
async fn test_translateText_withThrottle_shouldDelaySecondCall() {
    let mut config = TranslationConfig::default();
    config.common.throttle_ms = 50;
    config.common.cache_enabled = false;
    let service = service_with(MockProvider::echo(), config);

    let start = Instant::now();
    service.translate_text("one", "en", "fr").await.unwrap();
    service.translate_text("two", "en", "fr").await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(50));
}

/// Test that provider failures are counted and surfaced as provider errors
#[tokio::test]
async fn test_translateText_withFailingProvider_shouldCountFailure() {
    let service = service_with(MockProvider::failing(), TranslationConfig::default());

    let result = service.translate_text("olá mundo", "pt", "en").await;
    assert!(matches!(result, Err(TranslationError::Provider(_))));
    assert_eq!(service.stats().failed, 1);
}

/// Test that a provider losing placeholders produces a token mismatch
#[tokio::test]
async fn test_translateProtected_withDroppedTokens_shouldFailWithTokenMismatch() {
    let service = service_with(MockProvider::dropping_tokens(), TranslationConfig::default());

    let outcome = service.translate_protected("Olá {{nome}}, tudo bem?", "pt", "en").await;
    assert!(matches!(outcome, TextOutcome::Failed(TranslationError::TokenMismatch(_))));
}

/// Test that the mock connection check goes through the provider
#[tokio::test]
async fn test_testConnection_shouldReflectProviderHealth() {
    assert!(service_with(MockProvider::echo(), TranslationConfig::default()).test_connection().await.is_ok());
    assert!(service_with(MockProvider::failing(), TranslationConfig::default()).test_connection().await.is_err());
}
