/*!
 * Error types for the xlifftr application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota exhaustion
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map an HTTP status and body to the closest provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 | 456 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while reading, walking or writing an XLIFF document
#[derive(Error, Debug)]
pub enum XliffError {
    /// The input is not well-formed XML
    #[error("XML parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader message
        message: String,
    },

    /// The input is not valid UTF-8
    #[error("Invalid document encoding: {0}")]
    Encoding(String),

    /// The document has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// A path into the tree no longer points at an element
    #[error("Stale element path: {0:?}")]
    StalePath(Vec<usize>),

    /// Structure the walker cannot handle
    #[error("Unsupported structure: {0}")]
    Unsupported(String),

    /// The serializer could not emit an event
    #[error("XML write error: {0}")]
    Write(String),
}

/// Errors raised when translated text cannot be spliced back into an element
#[derive(Error, Debug, PartialEq)]
pub enum RebuildError {
    /// Inline markers were lost, duplicated or reordered by translation
    #[error("Inline marker mismatch: {0}")]
    MarkerMismatch(String),

    /// A text run could not be turned into element content even after escaping
    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Protected tokens did not survive the round trip
    #[error("Token mismatch: {0}")]
    TokenMismatch(String),

    /// Translated text could not be rebuilt into the element
    #[error("Rebuild error: {0}")]
    Rebuild(#[from] RebuildError),

    /// Every provider call made for a document failed
    #[error("Translation provider unavailable: {failed} of {attempted} calls failed")]
    ProviderUnavailable {
        /// Calls attempted
        attempted: usize,
        /// Calls that failed
        failed: usize,
    },

    /// Error with the document structure
    #[error("Document error: {0}")]
    Document(#[from] XliffError),
}
