/*!
 * Mock provider implementations for testing.
 *
 * This module provides a deterministic provider that simulates different behaviors:
 * - `MockProvider::uppercase()` - Returns the text upper-cased
 * - `MockProvider::echo()` - Returns the text unchanged
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::dropping_tokens()` - Loses every protected token
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::tokens::ANY_TOKEN_REGEX;

/// Mock request as seen by a custom response generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Upper-cases the text, tokens untouched
    Uppercase,
    /// Returns the text unchanged
    Echo,
    /// Prepends a fixed marker
    Prefix(&'static str),
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Removes every token from the text
    DropTokens,
    /// Simulates slow response, then echoes
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn prefix(prefix: &'static str) -> Self {
        Self::new(MockBehavior::Prefix(prefix))
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn dropping_tokens() -> Self {
        Self::new(MockBehavior::DropTokens)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used instead of the behavior's text
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    fn respond(&self, request: &MockRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }
        match self.behavior {
            MockBehavior::Uppercase => request.text.to_uppercase(),
            MockBehavior::Prefix(prefix) => format!("{}{}", prefix, request.text),
            MockBehavior::DropTokens => ANY_TOKEN_REGEX.replace_all(&request.text, "").into_owned(),
            _ => request.text.clone(),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockBehavior::Intermittent { fail_every } if count % fail_every == fail_every - 1 => {
                Err(ProviderError::ApiError {
                    message: format!("Simulated intermittent failure (request #{})", count + 1),
                    status_code: 503,
                })
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request))
            }
            _ => Ok(self.respond(&request)),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
