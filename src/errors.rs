/*!
 * Error types for the dualsub library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur when calling a translation provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The request could not be delivered (messaging or transport failure)
    #[error("Translation request failed: {0}")]
    RequestFailed(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The transport gave up waiting for a response
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error returned by the provider API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider answered but the response shape was unexpected
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The provider answered with no text at all
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify this error for user-facing messaging
    pub fn kind(&self) -> TranslationErrorKind {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::Timeout(_) => {
                TranslationErrorKind::Request
            }
            Self::ApiError { .. } | Self::RateLimitExceeded(_) | Self::AuthenticationError(_) => {
                TranslationErrorKind::Api
            }
            Self::ParseError(_) | Self::EmptyResponse => TranslationErrorKind::MalformedResponse,
        }
    }
}

/// Coarse failure category of a single cue translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationErrorKind {
    /// Transport or messaging failure
    Request,
    /// The provider rejected the request (4xx/5xx)
    Api,
    /// The provider answered with something we could not use
    MalformedResponse,
}

/// Errors that can occur while handling subtitle data
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Input was a WEBVTT document without any usable cue
    #[error("No usable cues in subtitle track for video {0}")]
    NoCues(String),
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A language code was not recognised
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// A numeric setting was outside its allowed range
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Name of the offending setting
        key: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read or written
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}
