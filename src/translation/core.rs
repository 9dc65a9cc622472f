/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which owns the
 * provider, the cache, the glossary and the throttle, and runs the per-text
 * pipeline: shield, glossary, provider call, token check, restore.
 */

use anyhow::{Result, anyhow};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::cache::{TranslationCache, truncate_text};
use super::glossary::Glossary;
use super::shield::PlaceholderShield;
use super::tokens::{self, TokenKind};
use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::{self, Provider};
use crate::validation::TokenValidator;

/// Log entry for capturing translation process logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
}

impl LogEntry {
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: "WARN".to_string(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: "INFO".to_string(),
            message: message.into(),
        }
    }
}

/// Provider call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Provider calls made
    pub attempted: usize,
    /// Provider calls that returned an error
    pub failed: usize,
    /// Texts answered from the cache
    pub cache_hits: usize,
}

impl ServiceStats {
    /// Counters accumulated since an earlier snapshot
    pub fn since(&self, earlier: &ServiceStats) -> ServiceStats {
        ServiceStats {
            attempted: self.attempted.saturating_sub(earlier.attempted),
            failed: self.failed.saturating_sub(earlier.failed),
            cache_hits: self.cache_hits.saturating_sub(earlier.cache_hits),
        }
    }
}

/// Result of running one text through the pipeline
#[derive(Debug)]
pub enum TextOutcome {
    /// Translation with every protected span restored
    Translated(String),
    /// Nothing to translate; the original text stands
    Unchanged,
    /// The text must keep its original value
    Failed(TranslationError),
}

/// Main translation service
pub struct TranslationService {
    /// Provider implementation
    provider: Box<dyn Provider>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Translation cache for storing and retrieving translations
    pub cache: TranslationCache,

    glossary: Glossary,

    /// When the last provider call started, for throttling
    last_call: Mutex<Option<Instant>>,

    attempted: AtomicUsize,
    failed: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider.name())
            .field("glossary_rules", &self.glossary.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl TranslationService {
    /// Create a new translation service with the provider the config selects
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let provider = providers::create_provider(&config)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Box<dyn Provider>, config: TranslationConfig) -> Self {
        let cache = TranslationCache::new(config.common.cache_enabled);
        Self {
            provider,
            config,
            cache,
            glossary: Glossary::default(),
            last_call: Mutex::new(None),
            attempted: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
        }
    }

    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossary = glossary;
        self
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Snapshot of the call counters
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            attempted: self.attempted.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
        }
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        debug!(
            "Testing connection to {} with model '{}'",
            self.config.provider.display_name(),
            self.config.get_model()
        );
        self.provider.test_connection().await.map_err(|e| {
            anyhow!(
                "Failed to connect to {}: {}",
                self.config.provider.display_name(),
                e
            )
        })
    }

    /// Sleep until the configured delay since the previous call has passed
    async fn throttle(&self) {
        let delay = Duration::from_millis(self.config.common.throttle_ms);
        if delay.is_zero() {
            return;
        }
        let wait = {
            let mut last_call = self.last_call.lock();
            let now = Instant::now();
            let wait = last_call
                .map(|previous| delay.saturating_sub(now.duration_since(previous)))
                .unwrap_or_default();
            *last_call = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            trace!("Throttling provider call for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Translate a single text string through the cache and the provider
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        if let Some(cached) = self.cache.get(text, source_language, target_language) {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            return Ok(cached);
        }

        self.throttle().await;
        self.attempted.fetch_add(1, Ordering::SeqCst);
        let start_time = Instant::now();

        match self.provider.translate(text, source_language, target_language).await {
            Ok(translated) => {
                trace!(
                    "{} answered in {:?}: '{}'",
                    self.provider.name(),
                    start_time.elapsed(),
                    truncate_text(&translated, 60)
                );
                self.cache.store(text, source_language, target_language, &translated);
                Ok(translated)
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                warn!("{} translation error: {}", self.provider.name(), e);
                Err(TranslationError::Provider(e))
            }
        }
    }

    /// Run one text through shield, glossary, provider and restore
    ///
    /// The text may carry inline markers; they pass through untouched and are
    /// checked later when the element is rebuilt.
    pub async fn translate_protected(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> TextOutcome {
        if text.trim().is_empty() {
            return TextOutcome::Unchanged;
        }

        let shielded = PlaceholderShield::protect(text);
        let guarded = self.glossary.protect_shielded(&shielded.text, &shielded.tokens);

        let restore = |translated: &str| {
            PlaceholderShield::restore(
                &Glossary::restore(translated, &guarded.restore_map),
                &shielded.tokens,
            )
        };

        if !tokens::has_translatable_text(&guarded.text) {
            // Glossary maps may still rewrite a text made only of terms
            let restored = restore(&guarded.text);
            return if restored == text {
                TextOutcome::Unchanged
            } else {
                TextOutcome::Translated(restored)
            };
        }

        let (leading, core, trailing) = split_edge_whitespace(&guarded.text);
        let translated = match self.translate_text(core, source_language, target_language).await {
            Ok(translated) => translated,
            Err(e) => return TextOutcome::Failed(e),
        };

        // Placeholders swallowed by glossary terms are not sent on their own
        let placeholders_sent = tokens::find_indices(&guarded.text, TokenKind::Placeholder);
        let glossary_sent: Vec<usize> = (0..guarded.restore_map.len()).collect();
        for (kind, expected) in [
            (TokenKind::Placeholder, &placeholders_sent),
            (TokenKind::Glossary, &glossary_sent),
        ] {
            let validation = TokenValidator::validate_indices(&translated, kind, expected);
            if !validation.passed() {
                return TextOutcome::Failed(TranslationError::TokenMismatch(validation.describe()));
            }
        }

        TextOutcome::Translated(format!("{}{}{}", leading, restore(&translated), trailing))
    }
}

/// Split text into leading whitespace, content and trailing whitespace
fn split_edge_whitespace(text: &str) -> (&str, &str, &str) {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len();
    if start >= end {
        return (text, "", "");
    }
    (&text[..start], &text[start..end], &text[end..])
}
